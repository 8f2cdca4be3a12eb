//! Shell tool — run a command with a timeout.
//!
//! stdout, stderr, and the exit code are reported independently. A nonzero
//! exit is an ordinary result, not an error.

use async_trait::async_trait;
use rayo_core::error::ToolError;
use rayo_core::tool::{CapabilityKind, Tool, ToolResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::required_str;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Execute shell commands through the platform shell.
pub struct RunBashTool {
    default_timeout_secs: u64,
}

impl RunBashTool {
    pub fn new() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    fn shell_command(command: &str) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for RunBashTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RunBashTool {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::RunBash
    }

    fn description(&self) -> &str {
        "Execute a bash command and return its output. Use with caution - requires user confirmation."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Seconds before the command is killed (default: 30)"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command = required_str(&arguments, "command")?;
        if command.trim().is_empty() {
            return Err(ToolError::EmptyCommand);
        }
        let timeout_secs = arguments["timeout"]
            .as_u64()
            .unwrap_or(self.default_timeout_secs);

        debug!(command = %command, timeout_secs, "Executing shell command");

        let child = Self::shell_command(command)
            .spawn()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "run_bash".into(),
                reason: format!("Failed to execute command: {e}"),
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output =
            match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
                .await
            {
                Ok(result) => result.map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "run_bash".into(),
                    reason: format!("Failed to execute command: {e}"),
                })?,
                Err(_) => {
                    warn!(command = %command, timeout_secs, "Command timed out");
                    return Err(ToolError::Timeout {
                        command: command.to_string(),
                        timeout_secs,
                    });
                }
            };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let code = output.status.code().unwrap_or(-1);
        if code != 0 {
            warn!(command = %command, exit_code = code, "Command failed");
        }

        Ok(ToolResult::new(code == 0, stdout)
            .with("error", stderr)
            .with("return_code", code)
            .with("command", command))
    }
}
