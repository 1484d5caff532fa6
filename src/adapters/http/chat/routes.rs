//! Route definitions for the chat and query endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{chat, health, retrieve, ChatAppState};

/// Create the API router
///
/// # Endpoints
///
/// - `POST /api/chat` - Run one conversational turn
/// - `POST /api/query/retrieve` - Retrieval only (development)
/// - `GET /health` - Liveness check
pub fn routes() -> Router<ChatAppState> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/query/retrieve", post(retrieve))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_creates_valid_router() {
        let _routes = routes();
    }
}
