//! AI Provider Adapters.
//!
//! Implementations of the LanguageModel port.
//!
//! ## Available Adapters
//!
//! - `MockLanguageModel` - Configurable mock for testing and offline runs
//! - `OpenAIProvider` - OpenAI chat completions and embeddings

mod mock_provider;
mod openai_provider;

pub use mock_provider::{mock_embedding, MockLanguageModel, MockResponse, MOCK_EMBEDDING_DIMENSIONS};
pub use openai_provider::{
    OpenAIConfig, OpenAIProvider, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL,
};
