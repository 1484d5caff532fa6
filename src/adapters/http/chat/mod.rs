//! HTTP adapters for the Ergo chat API
//!
//! Exposes the turn endpoint plus a retrieval-only query endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{status_for, ChatAppState};
pub use routes::routes;
