//! Solution Retriever Port - similarity search over the solution database.

use async_trait::async_trait;

use super::AIError;
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::retrieval::{RetrievalRequest, RetrievedSource};

/// Errors from retrieval.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetrievalError {
    #[error("Invalid retrieval request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] AIError),

    #[error("Vector store returned {status}: {message}")]
    Store { status: u16, message: String },

    #[error("Vector store unreachable: {0}")]
    Network(String),

    #[error("Unexpected vector store response: {0}")]
    Parse(String),
}

impl RetrievalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RetrievalError::InvalidRequest(err) => err.code(),
            RetrievalError::Embedding(_) => ErrorCode::AIProviderError,
            _ => ErrorCode::RetrievalError,
        }
    }
}

/// Port for fetching solution sources relevant to a question.
#[async_trait]
pub trait SolutionRetriever: Send + Sync {
    /// Returns sources ordered nearest first.
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<RetrievedSource>, RetrievalError>;
}
