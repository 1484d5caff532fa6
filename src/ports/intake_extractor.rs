//! Intake Extractor Port - structured fields from free-text messages.

use async_trait::async_trait;

use super::AIError;
use crate::domain::conversation::ChatMessage;
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::intake::Intake;

/// Errors from intake extraction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Language model failed: {0}")]
    Model(#[from] AIError),

    #[error("Extractor did not return valid JSON: {reason}")]
    InvalidJson { reason: String, raw: String },

    #[error("Extracted intake is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

impl ExtractionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExtractionError::Model(_) => ErrorCode::AIProviderError,
            ExtractionError::InvalidJson { .. } => ErrorCode::ExtractionError,
            ExtractionError::Invalid(err) => err.code(),
        }
    }
}

/// Port for reading intake values out of the conversation.
///
/// Returns only what the conversation states; unknown fields stay `None`.
#[async_trait]
pub trait IntakeExtractor: Send + Sync {
    async fn extract(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<Intake, ExtractionError>;
}
