//! The Rayo session loop.
//!
//! For every user message the session:
//!
//! 1. **Appends** the user turn to the conversation
//! 2. **Completes** via the configured provider
//! 3. **Interprets** the reply; plain text is returned as-is
//! 4. **Dispatches** a recognized action through the confirmation gate
//! 5. **Folds** the outcome back in and completes once more
//!
//! The system prompt is assembled from sections under a token budget that
//! widens once a capability has been used.

pub mod gate;
pub mod interpreter;
pub mod prompt;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use gate::{DenyAll, Dispatch, DispatchGate, Notice, Operator, Preview};
pub use interpreter::{Action, ResponseInterpreter};
pub use prompt::{PromptError, PromptOptions, load_prompt};
pub use session::{Session, SessionSettings};
