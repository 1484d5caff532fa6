//! HTTP adapters - REST API implementations.
//!
//! - `chat` - Turn, retrieval-query and health endpoints
//! - `knowledge` - Ingestion, chunk listing/deletion and question answering
//! - `router` - The assembled router with tracing, CORS and timeout layers

pub mod chat;
pub mod knowledge;
mod router;

// Re-export key types for convenience
pub use chat::{routes, status_for, ChatAppState, ErrorResponse};
pub use knowledge::{knowledge_routes, KnowledgeHandlers};
pub use router::{build_cors_layer, build_router};
