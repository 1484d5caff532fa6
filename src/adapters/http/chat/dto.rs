//! HTTP DTOs for the chat and query endpoints
//!
//! Field names are camelCase to match the front end.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::conversation::{ChatMessage, PhaseTag, ReplyMode, SessionState};
use crate::domain::foundation::ErrorCode;
use crate::domain::intake::IntakeForm;
use crate::domain::retrieval::RetrievedSource;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One chat turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub state: SessionState,
    /// Values typed into the intake form.
    #[serde(default)]
    pub form: Option<IntakeForm>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default, rename = "where")]
    pub filter: Option<Value>,
    #[serde(default = "default_true")]
    pub return_sources: bool,
}

fn default_true() -> bool {
    true
}

/// Non-string values read as absent so the handler reports them as missing.
pub(crate) fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Retrieval-only query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub question: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default, rename = "where")]
    pub filter: Option<Value>,
    #[serde(default)]
    pub min_similarity: Option<f64>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a chat turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub ok: bool,
    pub mode: ReplyMode,
    pub phase: PhaseTag,
    pub assistant_message: String,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<RetrievedSource>>,
    pub turn_id: String,
}

/// Response for a retrieval query
#[derive(Debug, Clone, Serialize)]
pub struct RetrieveResponse {
    pub ok: bool,
    pub sources: Vec<RetrievedSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}
