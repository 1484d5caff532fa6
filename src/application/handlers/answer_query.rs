//! AnswerQuery handler.
//!
//! Free-form question answering over the solution database, outside the
//! guided intake: retrieve, build a grounded prompt, ask the model.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::conversation::{recent_history, ChatMessage, Role};
use crate::domain::foundation::ErrorCode;
use crate::domain::retrieval::{build_context_block, RetrievalRequest, RetrievedSource};
use crate::ports::{AIError, CompletionRequest, LanguageModel, RetrievalError, SolutionRetriever};

const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful chat bot named Ergo.";

/// Prior messages sent with the question.
const ANSWER_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerQueryResult {
    pub answer: String,
    pub sources: Vec<RetrievedSource>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnswerQueryError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Answer generation failed: {0}")]
    Model(#[from] AIError),
}

impl AnswerQueryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnswerQueryError::Retrieval(err) => err.code(),
            AnswerQueryError::Model(err) => err.code(),
        }
    }
}

/// The user turn: sources, citation rules, then the question.
pub fn grounded_question(question: &str, sources: &[RetrievedSource]) -> String {
    format!(
        "Use the SOURCES below to answer the user.\n\
         If the answer is not in the sources, say that you don't know.\n\
         Cite sources inline like: [SOURCE 1], [SOURCE 2].\n\n\
         SOURCES:\n{}\n\n\
         QUESTION:\n{}",
        build_context_block(sources),
        question.trim()
    )
}

#[derive(Clone)]
pub struct AnswerQueryHandler {
    retriever: Arc<dyn SolutionRetriever>,
    model: Arc<dyn LanguageModel>,
}

impl AnswerQueryHandler {
    pub fn new(retriever: Arc<dyn SolutionRetriever>, model: Arc<dyn LanguageModel>) -> Self {
        Self { retriever, model }
    }

    pub async fn handle(
        &self,
        request: RetrievalRequest,
        history: &[ChatMessage],
    ) -> Result<AnswerQueryResult, AnswerQueryError> {
        request.validate().map_err(RetrievalError::from)?;
        let sources = self.retriever.retrieve(&request).await?;

        let completion = CompletionRequest::new()
            .with_system_prompt(ANSWER_SYSTEM_PROMPT)
            .with_history(recent_history(history, ANSWER_HISTORY_LIMIT))
            .with_message(Role::User, grounded_question(&request.question, &sources));
        let response = self.model.complete(completion).await?;

        tracing::debug!(
            sources = sources.len(),
            tokens = response.usage.total_tokens,
            "Answered query"
        );
        Ok(AnswerQueryResult {
            answer: response.content,
            sources,
        })
    }
}
