//! Built-in capability implementations for Rayo.
//!
//! The capability set is fixed: list a directory tree, read a file with
//! line numbers, prepare a unique-snippet patch, and run a shell command.
//! None of these ask for confirmation; the agent's dispatch gate does.

pub mod file_list;
pub mod file_patch;
pub mod file_read;
pub mod shell;

use rayo_core::tool::ToolRegistry;

pub use file_list::ListFilesTool;
pub use file_patch::{ApplyPatchTool, ApprovedPatch, PatchPlan, PersistedPatch};
pub use file_read::ReadFileTool;
pub use shell::RunBashTool;

/// Create the registry holding every built-in capability.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ListFilesTool::new()));
    registry.register(Box::new(ReadFileTool));
    registry.register(Box::new(ApplyPatchTool));
    registry.register(Box::new(RunBashTool::new()));
    registry
}

/// Pull a required string argument out of a parameter object.
pub(crate) fn required_str<'a>(
    arguments: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, rayo_core::ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| rayo_core::ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_capabilities() {
        let registry = default_registry();
        assert_eq!(
            registry.names(),
            vec!["apply_patch", "list_files", "read_file", "run_bash"]
        );
    }
}
