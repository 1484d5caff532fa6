//! HTTP adapters for the solution-document endpoints
//!
//! Ingestion, chunk inspection and free-form question answering.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::KnowledgeHandlers;
pub use routes::knowledge_routes;
