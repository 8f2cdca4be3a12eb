//! Patch tool — replace one unique snippet in a file, in two phases.
//!
//! Executing the tool only *computes* the new content. Writing it is a
//! separate step reachable only through [`PatchPlan::approve`], so a patch
//! cannot hit the disk without passing through the confirmation gate.
//!
//! ```text
//! PatchPlan (computed) --approve--> ApprovedPatch --persist--> PersistedPatch
//! ```

use async_trait::async_trait;
use rayo_core::error::ToolError;
use rayo_core::tool::{CapabilityKind, Tool, ToolResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::required_str;

const PREPARED: &str = "Patch prepared (awaiting confirmation)";

/// A computed, not yet written, single-occurrence replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    pub path: PathBuf,
    pub original: String,
    pub replacement: String,
    pub new_content: String,
}

/// A plan the operator said yes to.
#[derive(Debug)]
pub struct ApprovedPatch {
    plan: PatchPlan,
}

/// A patch that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPatch {
    pub path: PathBuf,
    pub bytes_written: usize,
}

impl PatchPlan {
    /// Compute the replacement against in-memory content.
    ///
    /// Occurrences are literal and non-overlapping; exactly one must exist.
    pub fn compute(
        path: impl Into<PathBuf>,
        content: &str,
        original: &str,
        replacement: &str,
    ) -> Result<Self, ToolError> {
        let path = path.into();
        if original.is_empty() {
            return Err(ToolError::InvalidArguments(
                "'original_snippet' cannot be empty".into(),
            ));
        }

        match content.matches(original).count() {
            0 => Err(ToolError::SnippetNotFound {
                path: path.display().to_string(),
            }),
            1 => Ok(Self {
                new_content: content.replacen(original, replacement, 1),
                original: original.to_string(),
                replacement: replacement.to_string(),
                path,
            }),
            count => Err(ToolError::AmbiguousSnippet {
                path: path.display().to_string(),
                count,
            }),
        }
    }

    /// Read the file and compute the replacement. Nothing is written.
    pub async fn prepare(path: &str, original: &str, replacement: &str) -> Result<Self, ToolError> {
        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(ToolError::NotFound(path.to_string()));
        }
        if !file_path.is_file() {
            return Err(ToolError::NotAFile(path.to_string()));
        }

        let resolved = tokio::fs::canonicalize(file_path)
            .await
            .unwrap_or_else(|_| file_path.to_path_buf());
        let bytes = tokio::fs::read(&resolved)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "apply_patch".into(),
                reason: format!("Failed to read file: {e}"),
            })?;
        let content =
            String::from_utf8(bytes).map_err(|_| ToolError::DecodeError(path.to_string()))?;

        Self::compute(resolved, &content, original, replacement)
    }

    /// The result handed back to the gate.
    pub fn to_result(&self) -> ToolResult {
        ToolResult::ok(PREPARED)
            .with("path", self.path.display().to_string())
            .with("original", self.original.as_str())
            .with("new", self.replacement.as_str())
            .with("new_content", self.new_content.as_str())
    }

    /// Recover a plan from a prepared result. `None` if any field is missing.
    pub fn from_result(result: &ToolResult) -> Option<Self> {
        if !result.success {
            return None;
        }
        Some(Self {
            path: PathBuf::from(result.field_str("path")?),
            original: result.field_str("original")?.to_string(),
            replacement: result.field_str("new")?.to_string(),
            new_content: result.field_str("new_content")?.to_string(),
        })
    }

    pub fn approve(self) -> ApprovedPatch {
        ApprovedPatch { plan: self }
    }
}

impl ApprovedPatch {
    /// Write the computed content over the target file.
    pub async fn persist(self) -> Result<PersistedPatch, ToolError> {
        ApplyPatchTool::write_file(&self.plan.path, &self.plan.new_content).await?;
        info!(path = %self.plan.path.display(), "Patch applied");
        Ok(PersistedPatch {
            bytes_written: self.plan.new_content.len(),
            path: self.plan.path,
        })
    }
}

pub struct ApplyPatchTool;

impl ApplyPatchTool {
    /// Overwrite `path` with `content`.
    pub async fn write_file(path: &Path, content: &str) -> Result<(), ToolError> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ToolError::WriteError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Tool for ApplyPatchTool {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::ApplyPatch
    }

    fn description(&self) -> &str {
        "Apply a patch to a file by replacing an original snippet with new content. Verifies the original snippet exists uniquely before applying the change."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file to patch"
                },
                "original_snippet": {
                    "type": "string",
                    "description": "The exact text to find; must occur exactly once"
                },
                "new_snippet": {
                    "type": "string",
                    "description": "The text to put in its place"
                }
            },
            "required": ["path", "original_snippet", "new_snippet"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let original = required_str(&arguments, "original_snippet")?;
        let replacement = required_str(&arguments, "new_snippet")?;

        debug!(path = %path, "Preparing patch");
        let plan = PatchPlan::prepare(path, original, replacement).await?;
        Ok(plan.to_result())
    }
}
