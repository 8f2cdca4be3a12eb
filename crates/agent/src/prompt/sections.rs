//! Splitting the authored prompt document into labeled sections.

use super::token::estimate_tokens;

/// One `## ` section of the prompt document, heading line included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSection {
    pub name: String,
    pub content: String,
    pub priority: u8,
}

impl PromptSection {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            priority: section_priority(&name),
            name,
            content: content.into(),
        }
    }

    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.content)
    }
}

/// Inclusion priority for a section heading.
///
/// 1 is always included, 2 on the first turn, 3 once tools are in use,
/// and 4 through 7 only while the token budget allows.
pub fn section_priority(name: &str) -> u8 {
    match name {
        "Identity" | "Core Principles" | "Response Format" => 1,
        "Session Initialization" => 2,
        "Available Tools" | "Guardrails and Validation" => 3,
        "Autonomous Project Understanding" | "Workflow Guidelines" => 4,
        "Best Practices" | "Example Interactions" => 5,
        _ => 7,
    }
}

/// Parse a markdown document into sections, in document order.
///
/// Lines before the first `## ` heading are dropped. A repeated heading
/// replaces the earlier section's content but keeps its position.
pub fn parse_sections(document: &str) -> Vec<PromptSection> {
    let mut sections: Vec<PromptSection> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in document.split('\n') {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((name, lines)) = current.take() {
                insert_section(&mut sections, PromptSection::new(name, lines.join("\n")));
            }
            current = Some((heading.trim().to_string(), vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((name, lines)) = current {
        insert_section(&mut sections, PromptSection::new(name, lines.join("\n")));
    }

    sections
}

fn insert_section(sections: &mut Vec<PromptSection>, section: PromptSection) {
    match sections.iter_mut().find(|s| s.name == section.name) {
        Some(existing) => *existing = section,
        None => sections.push(section),
    }
}
