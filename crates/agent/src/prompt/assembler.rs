//! Budgeted assembly of the system prompt from parsed sections.
//!
//! Tiers 1 to 3 are selected by conversation phase and never trimmed.
//! Tiers 4 to 7 are filled in ascending order while the running estimate
//! stays within `max_tokens`; a section that does not fit is skipped and
//! smaller ones after it may still be taken.

use super::sections::PromptSection;
use super::token::estimate_tokens;
use tracing::debug;

/// Budget used before any capability has run.
pub const FIRST_TURN_BUDGET: usize = 2000;

/// Budget used once a capability has been invoked.
pub const TOOL_TURN_BUDGET: usize = 4000;

/// Which phase of the conversation the prompt is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    pub is_first_message: bool,
    pub using_tools: bool,
    pub max_tokens: usize,
}

impl PromptOptions {
    pub fn first_turn() -> Self {
        Self {
            is_first_message: true,
            using_tools: false,
            max_tokens: FIRST_TURN_BUDGET,
        }
    }

    pub fn tool_turn() -> Self {
        Self {
            is_first_message: false,
            using_tools: true,
            max_tokens: TOOL_TURN_BUDGET,
        }
    }
}

/// Select sections for `options` and join them with a blank line.
pub fn assemble(sections: &[PromptSection], options: PromptOptions) -> String {
    let mut included: Vec<&PromptSection> = tier(sections, 1).collect();
    if options.is_first_message {
        included.extend(tier(sections, 2));
    }
    if options.using_tools {
        included.extend(tier(sections, 3));
    }

    let mut estimate: usize = estimate_tokens(
        &included
            .iter()
            .map(|s| s.content.as_str())
            .collect::<String>(),
    );

    for priority in 4..=7 {
        if estimate >= options.max_tokens {
            break;
        }
        for section in tier(sections, priority) {
            let cost = section.estimated_tokens();
            if estimate + cost <= options.max_tokens {
                included.push(section);
                estimate += cost;
            }
        }
    }

    debug!(
        sections = included.len(),
        estimated_tokens = estimate,
        budget = options.max_tokens,
        "Assembled system prompt"
    );

    included
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn tier(sections: &[PromptSection], priority: u8) -> impl Iterator<Item = &PromptSection> {
    sections.iter().filter(move |s| s.priority == priority)
}
