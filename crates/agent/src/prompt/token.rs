//! Token estimation for prompt budgeting.
//!
//! Uses a character-based heuristic: ~4 characters per token, rounded down.
//! Only used to decide which optional prompt sections fit, so a rough
//! figure is enough.

/// Estimate the token count for a string.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
