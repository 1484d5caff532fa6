//! HTTP DTOs for the document and question-answering endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::http::chat::dto::string_or_none;
use crate::domain::conversation::ChatMessage;
use crate::domain::retrieval::{ChunkRecord, RetrievedSource};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Document to chunk, embed and store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Paging for the chunk listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeekQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Question answered from the solution database.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub question: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
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

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub ok: bool,
    pub doc_id: String,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeekResponse {
    pub items: Vec<ChunkRecord>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteChunkResponse {
    pub ok: bool,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub ok: bool,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<RetrievedSource>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_request_reads_doc_id_and_metadata() {
        let req: IngestRequest = serde_json::from_str(
            r#"{"text": "Use a tug.", "docId": "carts", "metadata": {"title": "Carts"}}"#,
        )
        .unwrap();
        assert_eq!(req.text.as_deref(), Some("Use a tug."));
        assert_eq!(req.doc_id.as_deref(), Some("carts"));
        assert_eq!(req.metadata, Some(serde_json::json!({"title": "Carts"})));
    }

    #[test]
    fn non_string_text_reads_as_missing() {
        let req: IngestRequest = serde_json::from_str(r#"{"text": 12}"#).unwrap();
        assert!(req.text.is_none());
    }

    #[test]
    fn answer_request_defaults() {
        let req: AnswerRequest = serde_json::from_str(r#"{"question": "ramps?"}"#).unwrap();
        assert!(req.history.is_empty());
        assert!(req.return_sources);
        assert!(req.top_k.is_none());
    }

    #[test]
    fn ingest_response_is_camel_case() {
        let json = serde_json::to_value(IngestResponse {
            ok: true,
            doc_id: "carts".into(),
            chunk_count: 3,
        })
        .unwrap();
        assert_eq!(json["docId"], "carts");
        assert_eq!(json["chunkCount"], 3);
    }
}
