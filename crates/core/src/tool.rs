//! Tool trait — the abstraction over the assistant's capabilities.
//!
//! The capability set is closed: listing a directory, reading a file,
//! patching a file, and running a shell command. Each one implements
//! [`Tool`] and is identified by a [`CapabilityKind`].

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fixed set of capabilities the assistant can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    ListFiles,
    ReadFile,
    ApplyPatch,
    RunBash,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 4] = [
        CapabilityKind::ListFiles,
        CapabilityKind::ReadFile,
        CapabilityKind::ApplyPatch,
        CapabilityKind::RunBash,
    ];

    /// The stable identifier the model uses in its `"tool"` field.
    pub fn name(&self) -> &'static str {
        match self {
            CapabilityKind::ListFiles => "list_files",
            CapabilityKind::ReadFile => "read_file",
            CapabilityKind::ApplyPatch => "apply_patch",
            CapabilityKind::RunBash => "run_bash",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether a human must approve before the side effect happens.
    pub fn is_gated(&self) -> bool {
        matches!(self, CapabilityKind::ApplyPatch | CapabilityKind::RunBash)
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tool definition for documentation and tool-list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The outcome of a capability invocation.
///
/// Serializes flat: `{"success": .., "output": .., <capability fields>}`,
/// which is exactly what gets folded back into the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The primary output text
    pub output: String,

    /// Capability-specific fields (path, return_code, new_content, ...)
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ToolResult {
    pub fn new(success: bool, output: impl Into<String>) -> Self {
        Self {
            success,
            output: output.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn ok(output: impl Into<String>) -> Self {
        Self::new(true, output)
    }

    /// Attach a capability-specific field.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Read a string field back out.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Pretty JSON used as the body of the tool-result turn.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.output.clone())
    }
}

/// The uniform capability contract.
///
/// Implementations perform only the side effect they are named for and
/// never ask for confirmation themselves; that is the dispatch gate's job.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which member of the closed capability set this is.
    fn kind(&self) -> CapabilityKind;

    /// The unique name of this tool (e.g., "read_file").
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// A human-readable description of what this tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Render this tool for schema export.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools, keyed by their stable names.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Look a tool up, turning a miss into `UnknownCapability`.
    pub fn resolve(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::UnknownCapability(name.to_string()))
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        self.resolve(name)?.execute(arguments).await
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
