//! The conversation session — one user message in, one reply out.
//!
//! Each call to [`Session::chat`] makes at most two completions:
//!
//! 1. Append the user turn and ask the model.
//! 2. If the reply is an action, dispatch it through the gate, append the
//!    reply and a `Tool execution result: ...` turn, widen the system
//!    prompt for tool use, and ask once more.
//!
//! Completion failures come back as the reply text; the session stays usable.

use std::path::PathBuf;
use std::sync::Arc;

use rayo_config::RayoConfig;
use rayo_core::message::{Conversation, Message};
use rayo_core::provider::{Provider, ProviderRequest};
use tracing::{debug, info, warn};

use crate::gate::{DispatchGate, Notice};
use crate::interpreter::ResponseInterpreter;
use crate::prompt::{self, FALLBACK_PROMPT, PromptOptions};

/// Completion settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub custom_prompt_path: Option<PathBuf>,
}

impl SessionSettings {
    pub fn from_config(config: &RayoConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            custom_prompt_path: config.custom_prompt_path.as_ref().map(PathBuf::from),
        }
    }

    /// Use `model` in place of the configured one.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&RayoConfig::default())
    }
}

pub struct Session {
    conversation: Conversation,
    provider: Arc<dyn Provider>,
    gate: DispatchGate,
    interpreter: ResponseInterpreter,
    settings: SessionSettings,
    message_count: usize,
}

impl Session {
    /// Start a session with the first-turn system prompt.
    ///
    /// If the prompt document cannot be loaded the session starts with a
    /// short fallback prompt instead.
    pub fn new(provider: Arc<dyn Provider>, gate: DispatchGate, settings: SessionSettings) -> Self {
        let system_prompt =
            match prompt::load_prompt(settings.custom_prompt_path.as_deref(), PromptOptions::first_turn()) {
                Ok(prompt) => prompt,
                Err(e) => {
                    warn!("Failed to load system prompt: {e}; using fallback prompt");
                    gate.notify(Notice::Warning(format!(
                        "Failed to load dynamic prompt: {e}. Using fallback prompt."
                    )));
                    FALLBACK_PROMPT.to_string()
                }
            };

        let conversation = Conversation::new(system_prompt);
        info!(
            conversation_id = %conversation.id,
            provider = provider.name(),
            model = %settings.model,
            "Session started"
        );

        Self {
            conversation,
            provider,
            gate,
            interpreter: ResponseInterpreter::new(),
            settings,
            message_count: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// How many user messages this session has handled.
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// Process one user message and return the reply to show.
    pub async fn chat(&mut self, input: &str) -> String {
        self.message_count += 1;
        debug!(
            conversation_id = %self.conversation.id,
            message = self.message_count,
            "Processing user message"
        );
        self.conversation.push(Message::user(input));

        let reply = match self.complete().await {
            Ok(reply) => reply,
            Err(e) => return format!("Error communicating with LLM: {e}"),
        };

        let Some(action) = self.interpreter.interpret(&reply) else {
            self.conversation.push(Message::assistant(reply.as_str()));
            return reply;
        };

        let outcome = self.gate.dispatch(&action).await;
        self.widen_prompt_for_tools();

        self.conversation.push(Message::assistant(reply));
        self.conversation
            .push(Message::tool_result(outcome.to_turn_text()));

        match self.complete().await {
            Ok(follow_up) => {
                self.conversation.push(Message::assistant(follow_up.as_str()));
                follow_up
            }
            Err(e) => format!("Error getting follow-up response: {e}"),
        }
    }

    async fn complete(&self) -> Result<String, rayo_core::ProviderError> {
        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages: self.conversation.messages().to_vec(),
            temperature: self.settings.temperature,
            max_tokens: Some(self.settings.max_tokens),
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    debug!(
                        model = %response.model,
                        tokens_used = usage.total_tokens,
                        "Completion received"
                    );
                }
                Ok(response.content)
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Completion failed");
                Err(e)
            }
        }
    }

    /// Rebuild the system turn with the tool-use sections. On failure the
    /// current system turn stays as it is.
    fn widen_prompt_for_tools(&mut self) {
        match prompt::load_prompt(
            self.settings.custom_prompt_path.as_deref(),
            PromptOptions::tool_turn(),
        ) {
            Ok(prompt) => self.conversation.replace_system(prompt),
            Err(e) => debug!("Keeping existing system prompt: {e}"),
        }
    }
}
