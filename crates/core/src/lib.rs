//! # Rayo Core
//!
//! Domain types, traits, and error definitions for the Rayo coding assistant.
//! This crate has **no I/O of its own** — it defines the model that the
//! tools, providers, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is a trait or a closed enum defined here:
//! - `Provider` for the completion service
//! - `Tool` + `CapabilityKind` for the fixed capability set
//! - `Conversation` for the transcript every component reads or appends to

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{CapabilityKind, Tool, ToolRegistry, ToolResult};
