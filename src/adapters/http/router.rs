//! Application router with the cross-cutting layers applied.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::chat::{routes, ChatAppState};
use super::knowledge::{knowledge_routes, KnowledgeHandlers};

/// Build a CORS layer for the given origins.
///
/// Origins that are not valid header values are skipped.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Full router: API routes, request tracing, CORS and a request timeout.
pub fn build_router(
    state: ChatAppState,
    knowledge: KnowledgeHandlers,
    cors_origins: &[String],
    timeout: Duration,
) -> Router {
    routes()
        .with_state(state)
        .merge(knowledge_routes(knowledge))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
        .layer(TimeoutLayer::new(timeout))
}
