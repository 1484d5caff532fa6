//! HTTP handlers for the document and question-answering endpoints

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value};

use crate::adapters::http::chat::handlers::{
    api_error, bad_request, bounded_top_k, object_filter, ApiError,
};
use crate::application::{
    AnswerQueryError, AnswerQueryHandler, ChunkCatalogHandler, IngestDocumentCommand,
    IngestDocumentHandler, IngestError, QUERY_TOP_K,
};
use crate::domain::retrieval::{ChunkPage, RetrievalRequest};
use crate::ports::RetrievalError;

use super::dto::{
    AnswerRequest, AnswerResponse, DeleteChunkResponse, IngestRequest, IngestResponse, PeekQuery,
    PeekResponse,
};

/// Handlers behind the document endpoints
#[derive(Clone)]
pub struct KnowledgeHandlers {
    pub ingest: IngestDocumentHandler,
    pub catalog: ChunkCatalogHandler,
    pub answer: AnswerQueryHandler,
}

impl KnowledgeHandlers {
    pub fn new(
        ingest: IngestDocumentHandler,
        catalog: ChunkCatalogHandler,
        answer: AnswerQueryHandler,
    ) -> Self {
        Self {
            ingest,
            catalog,
            answer,
        }
    }
}

fn ingest_error(err: IngestError) -> ApiError {
    api_error(err.code(), err.to_string())
}

fn store_error(err: RetrievalError) -> ApiError {
    api_error(err.code(), err.to_string())
}

fn answer_error(err: AnswerQueryError) -> ApiError {
    api_error(err.code(), err.to_string())
}

/// Chunk, embed and store a document
///
/// POST /api/ingest
pub async fn ingest(
    State(handlers): State<KnowledgeHandlers>,
    Json(req): Json<IngestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = match req.text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(bad_request("text (string) is required")),
    };
    let metadata = match req.metadata {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(bad_request("metadata must be an object")),
    };

    let mut cmd = IngestDocumentCommand::new(text).with_metadata(metadata);
    cmd.doc_id = req.doc_id;
    let result = handlers.ingest.handle(cmd).await.map_err(ingest_error)?;

    Ok((
        StatusCode::OK,
        Json(IngestResponse {
            ok: true,
            doc_id: result.doc_id,
            chunk_count: result.chunk_count,
        }),
    ))
}

/// Page through stored chunks
///
/// GET /api/peek?limit=&offset=
pub async fn peek(
    State(handlers): State<KnowledgeHandlers>,
    Query(query): Query<PeekQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = ChunkPage::new(query.limit, query.offset);
    let items = handlers.catalog.list(page).await.map_err(store_error)?;

    Ok(Json(PeekResponse {
        items,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// Remove one stored chunk
///
/// DELETE /api/peek/:id
pub async fn delete_chunk(
    State(handlers): State<KnowledgeHandlers>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if id.trim().is_empty() {
        return Err(bad_request("id is required"));
    }
    handlers.catalog.delete(&id).await.map_err(store_error)?;

    Ok(Json(DeleteChunkResponse { ok: true, id }))
}

/// Retrieve and answer a free-form question
///
/// POST /api/query
pub async fn answer(
    State(handlers): State<KnowledgeHandlers>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = match req.question {
        Some(question) if !question.trim().is_empty() => question,
        _ => return Err(bad_request("question (string) is required")),
    };
    let top_k = bounded_top_k(req.top_k)?.unwrap_or(QUERY_TOP_K);

    let mut request = RetrievalRequest::new(question).with_top_k(top_k);
    request.filter = object_filter(req.filter)?;

    let result = handlers
        .answer
        .handle(request, &req.history)
        .await
        .map_err(answer_error)?;

    Ok(Json(AnswerResponse {
        ok: true,
        answer: result.answer,
        sources: req.return_sources.then_some(result.sources),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::ai::MockLanguageModel;
    use crate::adapters::retrieval::StaticRetriever;
    use crate::domain::retrieval::SourceMetadata;

    fn handlers(store: StaticRetriever) -> KnowledgeHandlers {
        let store = Arc::new(store);
        let model = Arc::new(MockLanguageModel::new());
        KnowledgeHandlers::new(
            IngestDocumentHandler::new(model.clone(), store.clone()),
            ChunkCatalogHandler::new(store.clone()),
            AnswerQueryHandler::new(store, model),
        )
    }

    fn ingest_request(text: Option<&str>, metadata: Option<Value>) -> IngestRequest {
        IngestRequest {
            text: text.map(str::to_string),
            doc_id: None,
            metadata,
        }
    }

    #[tokio::test]
    async fn ingest_requires_text() {
        let Err((status, Json(body))) =
            ingest(State(handlers(StaticRetriever::new())), Json(ingest_request(None, None))).await
        else {
            panic!("expected an error");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "text (string) is required");
    }

    #[tokio::test]
    async fn ingest_rejects_non_object_metadata() {
        let req = ingest_request(Some("Use a tug."), Some(Value::from("carts")));
        let result = ingest(State(handlers(StaticRetriever::new())), Json(req)).await;
        assert!(matches!(result, Err((status, _)) if status == StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn ingest_stores_chunks() {
        let store = StaticRetriever::new();
        let req = ingest_request(Some("Use a tug."), None);
        let result = ingest(State(handlers(store.clone())), Json(req)).await;

        assert!(result.is_ok());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn answer_rejects_top_k_outside_limits() {
        let req = AnswerRequest {
            question: Some("ramps?".into()),
            history: Vec::new(),
            top_k: Some(0),
            filter: None,
            return_sources: true,
        };
        let result = answer(State(handlers(StaticRetriever::new())), Json(req)).await;
        assert!(matches!(result, Err((status, _)) if status == StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn delete_reports_the_id() {
        let store = StaticRetriever::new();
        store.insert("one", SourceMetadata::default()).await;
        let result = delete_chunk(State(handlers(store.clone())), Path("chunk:0".to_string())).await;

        assert!(result.is_ok());
        assert!(store.is_empty().await);
    }
}
