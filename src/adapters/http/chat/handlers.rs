//! HTTP handlers for the chat and query endpoints
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use crate::application::{
    HandleTurnCommand, HandleTurnError, HandleTurnHandler, RetrieveSourcesHandler, QUERY_TOP_K,
};
use crate::domain::foundation::ErrorCode;
use crate::domain::retrieval::{RetrievalRequest, MAX_TOP_K};
use crate::ports::RetrievalError;

use super::dto::{
    ChatRequest, ChatResponse, ErrorResponse, HealthResponse, RetrieveRequest, RetrieveResponse,
};

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct ChatAppState {
    pub turn_handler: HandleTurnHandler,
    pub retrieve_handler: RetrieveSourcesHandler,
}

impl ChatAppState {
    pub fn new(turn_handler: HandleTurnHandler, retrieve_handler: RetrieveSourcesHandler) -> Self {
        Self {
            turn_handler,
            retrieve_handler,
        }
    }
}

/// HTTP status for an error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::MissingField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::IncompleteIntake | ErrorCode::DegenerateRisk => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::AIProviderError | ErrorCode::RetrievalError | ErrorCode::ExtractionError => {
            StatusCode::BAD_GATEWAY
        }
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn api_error(code: ErrorCode, message: impl Into<String>) -> ApiError {
    (status_for(code), Json(ErrorResponse::new(code, message)))
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_request(message)))
}

fn turn_error(err: HandleTurnError) -> ApiError {
    api_error(err.code(), err.to_string())
}

fn retrieval_error(err: RetrievalError) -> ApiError {
    api_error(err.code(), err.to_string())
}

/// Rejects a `where` filter that is present but not an object.
pub(crate) fn object_filter(filter: Option<Value>) -> Result<Option<Value>, ApiError> {
    match filter {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => Ok(Some(value)),
        Some(_) => Err(bad_request("where must be an object")),
    }
}

/// Rejects a `topK` outside `1..=MAX_TOP_K`.
pub(crate) fn bounded_top_k(top_k: Option<usize>) -> Result<Option<usize>, ApiError> {
    match top_k {
        Some(k) if !(1..=MAX_TOP_K).contains(&k) => Err(bad_request(&format!(
            "topK must be between 1 and {MAX_TOP_K}"
        ))),
        other => Ok(other),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Run one chat turn
///
/// POST /api/chat
pub async fn chat(
    State(app_state): State<ChatAppState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = match req.message {
        Some(message) if !message.trim().is_empty() => message,
        _ => return Err(bad_request("message (string) is required")),
    };
    let filter = object_filter(req.filter)?;
    let top_k = bounded_top_k(req.top_k)?;

    let cmd = HandleTurnCommand {
        message,
        history: req.history,
        state: req.state,
        form: req.form,
        top_k,
        filter,
    };

    let result = app_state
        .turn_handler
        .handle(cmd)
        .await
        .map_err(turn_error)?;

    let response = ChatResponse {
        ok: true,
        mode: result.mode,
        phase: result.phase,
        assistant_message: result.assistant_message,
        state: result.state,
        sources: req.return_sources.then_some(result.sources),
        turn_id: result.turn_id.to_string(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Retrieval only, for checking what the solution database returns
///
/// POST /api/query/retrieve
pub async fn retrieve(
    State(app_state): State<ChatAppState>,
    Json(req): Json<RetrieveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = match req.question {
        Some(question) if !question.trim().is_empty() => question,
        _ => return Err(bad_request("question (string) is required")),
    };

    let top_k = bounded_top_k(req.top_k)?.unwrap_or(QUERY_TOP_K);
    let mut request = RetrievalRequest::new(question).with_top_k(top_k);
    request.filter = object_filter(req.filter)?;
    request.min_similarity = req.min_similarity;

    let sources = app_state
        .retrieve_handler
        .handle(request)
        .await
        .map_err(retrieval_error)?;

    Ok((StatusCode::OK, Json(RetrieveResponse { ok: true, sources })))
}

/// Liveness check
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::narrative::{ScriptedIntakeExtractor, TemplateNarrator};
    use crate::adapters::retrieval::StaticRetriever;
    use crate::domain::conversation::SessionState;

    fn test_app_state() -> ChatAppState {
        let retriever = Arc::new(StaticRetriever::new());
        ChatAppState::new(
            HandleTurnHandler::new(
                Arc::new(ScriptedIntakeExtractor::new()),
                retriever.clone(),
                Arc::new(TemplateNarrator::new()),
            ),
            RetrieveSourcesHandler::new(retriever),
        )
    }

    fn chat_request(message: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: message.map(str::to_string),
            history: Vec::new(),
            state: SessionState::new(),
            form: None,
            top_k: None,
            filter: None,
            return_sources: true,
        }
    }

    #[tokio::test]
    async fn chat_handler_succeeds() {
        let result = chat(State(test_app_state()), Json(chat_request(Some("hello")))).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn chat_handler_requires_message() {
        let Err((status, Json(body))) =
            chat(State(test_app_state()), Json(chat_request(None))).await
        else {
            panic!("expected an error");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "message (string) is required");
    }

    #[tokio::test]
    async fn chat_handler_rejects_non_object_where() {
        let mut req = chat_request(Some("hello"));
        req.filter = Some(Value::String("docId".into()));
        let result = chat(State(test_app_state()), Json(req)).await;
        assert!(matches!(result, Err((status, _)) if status == StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn chat_handler_rejects_top_k_outside_limits() {
        for top_k in [0, MAX_TOP_K + 1] {
            let mut req = chat_request(Some("hello"));
            req.top_k = Some(top_k);
            let Err((status, Json(body))) = chat(State(test_app_state()), Json(req)).await else {
                panic!("expected an error for topK {top_k}");
            };
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.message, "topK must be between 1 and 50");
        }
    }

    #[test]
    fn top_k_within_limits_passes_through() {
        assert!(matches!(bounded_top_k(None), Ok(None)));
        assert!(matches!(bounded_top_k(Some(1)), Ok(Some(1))));
        assert!(matches!(bounded_top_k(Some(MAX_TOP_K)), Ok(Some(50))));
    }

    #[tokio::test]
    async fn retrieve_handler_requires_question() {
        let req = RetrieveRequest {
            question: Some("  ".into()),
            top_k: None,
            filter: None,
            min_similarity: None,
        };
        let result = retrieve(State(test_app_state()), Json(req)).await;
        assert!(matches!(result, Err((status, _)) if status == StatusCode::BAD_REQUEST));
    }

    #[test]
    fn collaborator_failures_map_to_bad_gateway() {
        assert_eq!(status_for(ErrorCode::AIProviderError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorCode::RetrievalError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorCode::OutOfRange), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::IncompleteIntake), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
