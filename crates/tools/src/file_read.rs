//! File read tool — return a text file with line numbers.

use async_trait::async_trait;
use rayo_core::error::ToolError;
use rayo_core::tool::{CapabilityKind, Tool, ToolResult};
use std::path::Path;

use crate::required_str;

pub struct ReadFileTool;

/// Prefix every line with a right-aligned, 1-based line number.
///
/// Splits on `\n` only, so a trailing newline yields a final empty line.
pub fn number_lines(content: &str) -> (String, usize) {
    let lines: Vec<String> = content
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:>4} | {}", i + 1, line))
        .collect();
    let count = lines.len();
    (lines.join("\n"), count)
}

#[async_trait]
impl Tool for ReadFileTool {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::ReadFile
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Returns content with line numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let file_path = Path::new(path);

        if !file_path.exists() {
            return Err(ToolError::NotFound(path.to_string()));
        }
        if !file_path.is_file() {
            return Err(ToolError::NotAFile(path.to_string()));
        }

        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!("Failed to read file: {e}"),
            })?;
        let content =
            String::from_utf8(bytes).map_err(|_| ToolError::DecodeError(path.to_string()))?;

        let (numbered, lines) = number_lines(&content);
        let resolved = tokio::fs::canonicalize(file_path)
            .await
            .unwrap_or_else(|_| file_path.to_path_buf());

        Ok(ToolResult::ok(numbered)
            .with("path", resolved.display().to_string())
            .with("lines", lines))
    }
}
