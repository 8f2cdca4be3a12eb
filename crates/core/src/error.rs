//! Error types for the Rayo domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; capability failures are
//! values the dispatch gate matches on, never panics.

use thiserror::Error;

/// Failures of the external completion service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures raised by a capability or by the gate around it.
///
/// A shape-valid JSON value that is not an action is *not* an error; the
/// interpreter reports it as "no action".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Path does not exist: {0}")]
    NotFound(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Path is not a file: {0}")]
    NotAFile(String),

    #[error("File is not a text file or uses unsupported encoding: {0}")]
    DecodeError(String),

    #[error("Original snippet not found in {path}. Please verify the exact text to replace.")]
    SnippetNotFound { path: String },

    #[error(
        "Original snippet found {count} times in {path}. Please provide a more specific snippet that appears only once."
    )]
    AmbiguousSnippet { path: String, count: usize },

    #[error("Command cannot be empty")]
    EmptyCommand,

    #[error("Command timed out after {timeout_secs} seconds: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("Failed to write file {path}: {reason}")]
    WriteError { path: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownCapability(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}
