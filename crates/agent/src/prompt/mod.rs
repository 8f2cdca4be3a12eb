//! System prompt assembly.
//!
//! The prompt is authored as one markdown document split on `## `
//! headings. Each heading maps to a priority tier, and the assembler picks
//! tiers by conversation phase and token budget:
//!
//! | Tier | Sections | Included |
//! |------|----------|----------|
//! | 1 | Identity, Core Principles, Response Format | always |
//! | 2 | Session Initialization | first turn |
//! | 3 | Available Tools, Guardrails and Validation | once tools run |
//! | 4 | Autonomous Project Understanding, Workflow Guidelines | budget |
//! | 5 | Best Practices, Example Interactions | budget |
//! | 7 | anything else | budget |

pub mod assembler;
pub mod sections;
pub mod token;

use std::path::{Path, PathBuf};

pub use assembler::{FIRST_TURN_BUDGET, PromptOptions, TOOL_TURN_BUDGET, assemble};
pub use sections::{PromptSection, parse_sections, section_priority};

/// The prompt document compiled into the binary.
pub const BUILTIN_PROMPT: &str = include_str!("system_prompt.md");

/// Used when the prompt document cannot be loaded at session start.
pub const FALLBACK_PROMPT: &str =
    "You are Rayo, an AI coding assistant. Help users with their coding tasks.";

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Failed to read prompt file {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Prompt document has no '## ' sections")]
    NoSections,
}

/// Load the prompt document and assemble it for `options`.
///
/// Reads `custom_path` when given, otherwise the built-in document. The
/// document is re-read on every call so edits take effect on the next turn.
pub fn load_prompt(custom_path: Option<&Path>, options: PromptOptions) -> Result<String, PromptError> {
    let document = match custom_path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| PromptError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?,
        None => BUILTIN_PROMPT.to_string(),
    };

    let sections = parse_sections(&document);
    if sections.is_empty() {
        return Err(PromptError::NoSections);
    }
    Ok(assemble(&sections, options))
}
