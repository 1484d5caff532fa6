//! Route definitions for the document and question-answering endpoints

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers::{answer, delete_chunk, ingest, peek, KnowledgeHandlers};

/// Create the document router with its handlers applied.
///
/// # Endpoints
///
/// - `POST /api/ingest` - Chunk, embed and store a document
/// - `GET /api/peek` - Page through stored chunks
/// - `DELETE /api/peek/:id` - Remove one chunk
/// - `POST /api/query` - Retrieve and answer a free-form question
pub fn knowledge_routes(handlers: KnowledgeHandlers) -> Router {
    Router::new()
        .route("/api/ingest", post(ingest))
        .route("/api/peek", get(peek))
        .route("/api/peek/:id", delete(delete_chunk))
        .route("/api/query", post(answer))
        .with_state(handlers)
}
