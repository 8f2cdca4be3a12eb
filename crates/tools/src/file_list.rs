//! Directory lister — a depth-bounded tree of a directory.
//!
//! Build, cache, virtual-env, and dependency directories are skipped, as is
//! anything hidden. Skipped entries are neither shown nor descended into.

use async_trait::async_trait;
use rayo_core::error::ToolError;
use rayo_core::tool::{CapabilityKind, Tool, ToolResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory names that never appear in a listing.
pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "node_modules",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "dist",
    "build",
    "target",
];

pub const DEFAULT_MAX_DEPTH: usize = 5;

const TRUNCATED: &str = "[...]";
const PERMISSION_DENIED: &str = "[Permission Denied]";

pub struct ListFilesTool {
    max_depth: usize,
}

impl ListFilesTool {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for ListFilesTool {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name.ends_with(".egg-info") || IGNORED_DIRS.contains(&name)
}

/// Human-readable size with one decimal place and a 1024 divisor.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Render `dir`'s children, descending while `depth` remains.
fn render_tree(dir: &Path, prefix: &str, depth: usize) -> io::Result<String> {
    if depth == 0 {
        return Ok(format!("{prefix}{TRUNCATED}\n"));
    }

    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Ok(format!("{prefix}{PERMISSION_DENIED}\n"));
        }
        Err(e) => return Err(e),
    };

    let mut entries: Vec<Entry> = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_ignored(&name) {
            continue;
        }
        let path = entry.path();
        entries.push(Entry {
            is_dir: path.is_dir(),
            name,
            path,
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    let mut out = String::new();
    let count = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { "└── " } else { "├── " };
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });

        if entry.is_dir {
            out.push_str(&format!("{prefix}{branch}{}/\n", entry.name));
            out.push_str(&render_tree(&entry.path, &child_prefix, depth - 1)?);
        } else {
            match std::fs::metadata(&entry.path) {
                Ok(meta) => out.push_str(&format!(
                    "{prefix}{branch}{} ({})\n",
                    entry.name,
                    format_size(meta.len())
                )),
                Err(_) => out.push_str(&format!("{prefix}{branch}{}\n", entry.name)),
            }
        }
    }
    Ok(out)
}

#[async_trait]
impl Tool for ListFilesTool {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::ListFiles
    }

    fn description(&self) -> &str {
        "List files and directories in a given path. Returns a tree structure. Ignores common build/cache directories."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list (default: current directory)"
                },
                "max_depth": {
                    "type": "integer",
                    "description": "How many levels to descend (default: 5)"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = match &arguments["path"] {
            serde_json::Value::Null => ".",
            value => value
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("'path' must be a string".into()))?,
        };
        let max_depth = arguments["max_depth"]
            .as_u64()
            .map(|d| d as usize)
            .unwrap_or(self.max_depth);

        let target = Path::new(path);
        if !target.exists() {
            return Err(ToolError::NotFound(path.to_string()));
        }
        if !target.is_dir() {
            return Err(ToolError::NotADirectory(path.to_string()));
        }
        let root = std::fs::canonicalize(target).unwrap_or_else(|_| target.to_path_buf());

        debug!(path = %root.display(), max_depth, "Listing directory");

        let walk_root = root.clone();
        let tree = tokio::task::spawn_blocking(move || render_tree(&walk_root, "", max_depth))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "list_files".into(),
                reason: e.to_string(),
            })?
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "list_files".into(),
                reason: format!("Failed to list files: {e}"),
            })?;

        Ok(ToolResult::ok(tree).with("path", root.display().to_string()))
    }
}
