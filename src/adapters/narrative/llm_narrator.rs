//! Reply generation through a language model.

use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::{system_prompt, user_prompt};
use crate::domain::conversation::{recent_history, AssistantDirective, ChatMessage, Phase, Role};
use crate::ports::{CompletionRequest, LanguageModel, NarrativeError, NarrativeGenerator};

/// Number of prior messages sent along with each reply request.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// [`NarrativeGenerator`] that prompts a [`LanguageModel`] per phase.
pub struct LlmNarrator {
    model: Arc<dyn LanguageModel>,
    history_limit: usize,
    temperature: f32,
}

impl LlmNarrator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            history_limit: DEFAULT_HISTORY_LIMIT,
            temperature: 0.2,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builds the completion request for a directive.
    pub fn build_request(
        &self,
        directive: &AssistantDirective,
        history: &[ChatMessage],
    ) -> CompletionRequest {
        // Introductions answer the opening message alone.
        let history: &[ChatMessage] = if directive.phase.is(Phase::Intro) {
            &[]
        } else {
            recent_history(history, self.history_limit)
        };

        CompletionRequest::new()
            .with_system_prompt(system_prompt(directive))
            .with_history(history)
            .with_message(Role::User, user_prompt(directive))
            .with_temperature(self.temperature)
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    async fn narrate(
        &self,
        directive: &AssistantDirective,
        history: &[ChatMessage],
    ) -> Result<String, NarrativeError> {
        let request = self.build_request(directive, history);
        let response = self.model.complete(request).await?;

        let reply = response.content.trim();
        if reply.is_empty() {
            return Err(NarrativeError::EmptyReply);
        }

        tracing::debug!(
            mode = %directive.mode,
            model = %response.model,
            tokens = response.usage.total_tokens,
            "Generated assistant reply"
        );
        Ok(reply.to_string())
    }
}
