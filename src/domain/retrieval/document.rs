//! Stored solution-document chunks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SourceMetadata;

/// Page size when a listing does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 25;

/// Largest page a listing returns.
pub const MAX_PAGE_LIMIT: usize = 200;

/// A chunk ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub id: String,
    pub content: String,
    pub metadata: SourceMetadata,
    pub embedding: Vec<f32>,
}

/// A chunk as listed back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub document: String,
    pub metadata: SourceMetadata,
}

/// Window into the stored chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkPage {
    pub limit: usize,
    pub offset: usize,
}

impl Default for ChunkPage {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl ChunkPage {
    /// Missing values take the defaults; `limit` is capped at [`MAX_PAGE_LIMIT`].
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Store id of a chunk: `{doc_id}:{index}`.
pub fn chunk_id(doc_id: &str, index: usize) -> String {
    format!("{}:{}", doc_id, index)
}

/// Metadata written with a chunk.
///
/// `docId` and `chunkIndex` are set first; caller metadata is laid over them
/// and wins on conflicting keys.
pub fn chunk_metadata(doc_id: &str, index: usize, extra: &Map<String, Value>) -> SourceMetadata {
    let mut merged = Map::new();
    merged.insert("docId".to_string(), Value::from(doc_id));
    merged.insert("chunkIndex".to_string(), Value::from(index));
    merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    SourceMetadata::from_json(&Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_ids_join_doc_and_index() {
        assert_eq!(chunk_id("guide", 3), "guide:3");
    }

    #[test]
    fn metadata_carries_doc_and_index() {
        let extra = json!({"title": "Carts", "source": "pdf"});
        let meta = chunk_metadata("guide", 2, extra.as_object().unwrap());

        assert_eq!(meta.doc_id.as_deref(), Some("guide"));
        assert_eq!(meta.chunk_index, Some(2));
        assert_eq!(meta.title.as_deref(), Some("Carts"));
        assert_eq!(meta.extra.get("source"), Some(&json!("pdf")));
    }

    #[test]
    fn caller_metadata_overrides_doc_id() {
        let extra = json!({"docId": "override"});
        let meta = chunk_metadata("generated", 0, extra.as_object().unwrap());
        assert_eq!(meta.doc_id.as_deref(), Some("override"));
    }

    #[test]
    fn page_defaults_and_cap() {
        assert_eq!(ChunkPage::new(None, None), ChunkPage { limit: 25, offset: 0 });
        assert_eq!(ChunkPage::new(Some(500), Some(10)), ChunkPage { limit: 200, offset: 10 });
    }

    #[test]
    fn record_serializes_document_field() {
        let record = ChunkRecord {
            id: "guide:0".to_string(),
            document: "Use a tug.".to_string(),
            metadata: chunk_metadata("guide", 0, &Map::new()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["document"], "Use a tug.");
        assert_eq!(json["metadata"], json!({"docId": "guide", "chunkIndex": 0}));
    }
}
