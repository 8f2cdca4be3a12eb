//! Response interpreter — pull an action out of free-form model text.
//!
//! The model asks for a capability by replying with a JSON object, either
//! bare or inside a fenced code block:
//!
//! ```text
//! {"tool": "read_file", "parameters": {"path": "a.py"}, "reasoning": "..."}
//! ```
//!
//! Anything that does not decode to that shape is an ordinary reply.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_RATIONALE: &str = "No reasoning provided";

/// A capability request recognized in a model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub capability: String,
    pub parameters: Map<String, Value>,
    pub rationale: String,
}

impl Action {
    pub fn parameters_value(&self) -> Value {
        Value::Object(self.parameters.clone())
    }
}

/// Extracts [`Action`]s from model replies.
pub struct ResponseInterpreter {
    json_fence: Regex,
    any_fence: Regex,
}

impl ResponseInterpreter {
    pub fn new() -> Self {
        Self {
            json_fence: Regex::new(r"(?si)```json\s*\n(.*?)\n```").expect("hardcoded regex"),
            any_fence: Regex::new(r"(?s)```[^\n`]*\n(.*?)\n```").expect("hardcoded regex"),
        }
    }

    /// The text that should hold the JSON payload.
    ///
    /// A `json`-labeled fence wins over any other fence; with no fence the
    /// whole reply is used.
    fn payload<'a>(&self, response: &'a str) -> &'a str {
        let text = response.trim();
        if !text.contains("```") {
            return text;
        }
        self.json_fence
            .captures(text)
            .or_else(|| self.any_fence.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or(text)
    }

    /// Interpret a reply. `None` means it is an ordinary answer.
    pub fn interpret(&self, response: &str) -> Option<Action> {
        let payload = self.payload(response);
        let Ok(Value::Object(mut data)) = serde_json::from_str::<Value>(payload) else {
            return None;
        };

        let capability = match data.remove("tool").or_else(|| data.remove("capability")) {
            Some(Value::String(name)) => name,
            _ => return None,
        };

        let parameters = match data.remove("parameters") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                debug!(capability = %capability, "Ignoring action with non-object parameters");
                return None;
            }
        };

        let rationale = data
            .remove("reasoning")
            .or_else(|| data.remove("rationale"))
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| DEFAULT_RATIONALE.to_string());

        debug!(capability = %capability, "Recognized action");
        Some(Action {
            capability,
            parameters,
            rationale,
        })
    }
}

impl Default for ResponseInterpreter {
    fn default() -> Self {
        Self::new()
    }
}
