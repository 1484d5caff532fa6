//! RetrieveSources query handler.
//!
//! Retrieval only, no narration. Backs the development endpoint used to
//! inspect what the solution database returns for a question.

use std::sync::Arc;

use crate::domain::retrieval::{RetrievalRequest, RetrievedSource};
use crate::ports::{RetrievalError, SolutionRetriever};

/// Default `topK` for direct queries.
pub const QUERY_TOP_K: usize = 5;

#[derive(Clone)]
pub struct RetrieveSourcesHandler {
    retriever: Arc<dyn SolutionRetriever>,
}

impl RetrieveSourcesHandler {
    pub fn new(retriever: Arc<dyn SolutionRetriever>) -> Self {
        Self { retriever }
    }

    pub async fn handle(&self, request: RetrievalRequest) -> Result<Vec<RetrievedSource>, RetrievalError> {
        request.validate()?;
        let sources = self.retriever.retrieve(&request).await?;
        tracing::debug!(count = sources.len(), top_k = request.top_k, "Query retrieved sources");
        Ok(sources)
    }
}
