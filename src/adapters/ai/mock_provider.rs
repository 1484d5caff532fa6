//! Mock language model for testing.
//!
//! Provides a configurable mock implementation of the LanguageModel port,
//! allowing tests and offline runs to work without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Simulated delays for timeout testing
//! - Error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let model = MockLanguageModel::new()
//!     .with_response("Hi, I'm Ergo!")
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = model.complete(request).await?;
//! assert_eq!(response.content, "Hi, I'm Ergo!");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, CompletionRequest, CompletionResponse, FinishReason, LanguageModel, ProviderInfo,
    TokenUsage,
};

/// Dimension of the vectors returned by [`MockLanguageModel::embed`].
pub const MOCK_EMBEDDING_DIMENSIONS: usize = 8;

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    Error(AIError),
}

/// Mock language model for testing.
#[derive(Debug, Clone)]
pub struct MockLanguageModel {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    embedding_error: Option<AIError>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    embedded: Arc<Mutex<Vec<String>>>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            embedding_error: None,
            info: ProviderInfo::new("mock", "mock-chat-1", "mock-embedding-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            embedded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: AIError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Makes every embedding call fail.
    pub fn with_embedding_error(mut self, error: AIError) -> Self {
        self.embedding_error = Some(error);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of completion calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded completion requests.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Texts passed to `embed`, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        lock(&self.embedded).clone()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                finish_reason: FinishReason::Stop,
            })
    }
}

/// Deterministic pseudo-embedding: byte sums bucketed by position, normalized.
pub fn mock_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; MOCK_EMBEDDING_DIMENSIONS];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % MOCK_EMBEDDING_DIMENSIONS] += f32::from(byte);
    }
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                content,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: self.info.chat_model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err),
        }
    }

    async fn embed(&self, input: &str) -> Result<Vec<f32>, AIError> {
        lock(&self.embedded).push(input.to_string());
        match &self.embedding_error {
            Some(err) => Err(err.clone()),
            None => Ok(mock_embedding(input)),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
