//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `LanguageModel` - Chat completion and embeddings
//! - `NarrativeGenerator` - Assistant reply text from a directive
//! - `IntakeExtractor` - Structured intake fields from free text
//! - `SolutionRetriever` - Similarity search over the solution database
//! - `DocumentStore` - Writes, listings and deletes of stored chunks

mod document_store;
mod intake_extractor;
mod language_model;
mod narrative_generator;
mod solution_retriever;

pub use document_store::DocumentStore;
pub use intake_extractor::{ExtractionError, IntakeExtractor};
pub use language_model::{
    AIError, CompletionRequest, CompletionResponse, FinishReason, LanguageModel, ProviderInfo,
    ResponseFormat, TokenUsage,
};
pub use narrative_generator::{NarrativeError, NarrativeGenerator};
pub use solution_retriever::{RetrievalError, SolutionRetriever};
