//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Language model providers (OpenAI, mock)
//! - `narrative` - Reply generation and intake extraction on top of a language model
//! - `retrieval` - Solution database clients (Chroma, in-memory)
//! - `http` - REST API

pub mod ai;
pub mod http;
pub mod narrative;
pub mod retrieval;

pub use ai::{MockLanguageModel, OpenAIConfig, OpenAIProvider};
pub use http::{build_router, ChatAppState};
pub use narrative::{LlmIntakeExtractor, LlmNarrator, ScriptedIntakeExtractor, TemplateNarrator};
pub use retrieval::{ChromaConfig, ChromaRetriever, StaticRetriever};
