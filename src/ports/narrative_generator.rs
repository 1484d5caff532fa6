//! Narrative Generator Port - turns assistant directives into reply text.

use async_trait::async_trait;

use super::AIError;
use crate::domain::conversation::{AssistantDirective, ChatMessage};
use crate::domain::foundation::ErrorCode;

/// Errors from narration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NarrativeError {
    #[error("Language model failed: {0}")]
    Model(#[from] AIError),

    #[error("Language model returned an empty reply")]
    EmptyReply,
}

impl NarrativeError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::AIProviderError
    }
}

/// Port for producing the assistant's reply.
///
/// Output is free text with no determinism or latency guarantee.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(
        &self,
        directive: &AssistantDirective,
        history: &[ChatMessage],
    ) -> Result<String, NarrativeError>;
}
