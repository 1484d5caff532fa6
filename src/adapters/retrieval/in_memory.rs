//! In-memory SolutionRetriever and DocumentStore for tests and offline runs.
//!
//! Chunks inserted directly are embedded with the deterministic mock
//! embedding; upserted chunks keep the embedding they arrive with. Queries
//! rank by cosine distance.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::adapters::ai::mock_embedding;
use crate::domain::retrieval::{
    filter_by_distance, ChunkPage, ChunkRecord, EmbeddedChunk, RetrievalRequest, RetrievedSource,
    SourceMetadata,
};
use crate::ports::{DocumentStore, RetrievalError, SolutionRetriever};

#[derive(Debug, Clone)]
struct StoredChunk {
    source: RetrievedSource,
    embedding: Vec<f32>,
}

/// Retriever over a fixed set of chunks held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    chunks: Arc<RwLock<Vec<StoredChunk>>>,
    failure: Option<RetrievalError>,
}

impl StaticRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chunk. Ids follow insertion order.
    pub async fn insert(&self, content: impl Into<String>, metadata: SourceMetadata) {
        let content = content.into();
        let mut chunks = self.chunks.write().await;
        let id = format!("chunk:{}", chunks.len());
        chunks.push(StoredChunk {
            embedding: mock_embedding(&content),
            source: RetrievedSource {
                id,
                content,
                metadata,
                distance: None,
            },
        });
    }

    /// Stored chunk ids in store order.
    pub async fn ids(&self) -> Vec<String> {
        self.chunks
            .read()
            .await
            .iter()
            .map(|chunk| chunk.source.id.clone())
            .collect()
    }

    /// Makes every query and write fail with `error`.
    pub fn with_failure(mut self, error: RetrievalError) -> Self {
        self.failure = Some(error);
        self
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - f64::from(dot / (norm_a * norm_b))
}

fn matches_filter(metadata: &SourceMetadata, filter: Option<&Value>) -> bool {
    let Some(Value::Object(wanted)) = filter else {
        return true;
    };
    let actual = serde_json::to_value(metadata).unwrap_or(Value::Null);
    wanted.iter().all(|(key, value)| actual.get(key) == Some(value))
}

#[async_trait]
impl SolutionRetriever for StaticRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<RetrievedSource>, RetrievalError> {
        request.validate()?;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let query = mock_embedding(&request.question);
        let chunks = self.chunks.read().await;

        let mut ranked: Vec<RetrievedSource> = chunks
            .iter()
            .filter(|chunk| matches_filter(&chunk.source.metadata, request.filter.as_ref()))
            .map(|chunk| RetrievedSource {
                distance: Some(cosine_distance(&query, &chunk.embedding)),
                ..chunk.source.clone()
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.distance
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance.unwrap_or(f64::MAX))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(request.top_k);

        Ok(filter_by_distance(ranked, request.min_similarity))
    }
}

#[async_trait]
impl DocumentStore for StaticRetriever {
    async fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> Result<(), RetrievalError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut stored = self.chunks.write().await;
        for chunk in chunks {
            let entry = StoredChunk {
                source: RetrievedSource {
                    id: chunk.id,
                    content: chunk.content,
                    metadata: chunk.metadata,
                    distance: None,
                },
                embedding: chunk.embedding,
            };
            match stored.iter_mut().find(|s| s.source.id == entry.source.id) {
                Some(existing) => *existing = entry,
                None => stored.push(entry),
            }
        }
        Ok(())
    }

    async fn list(&self, page: ChunkPage) -> Result<Vec<ChunkRecord>, RetrievalError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self
            .chunks
            .read()
            .await
            .iter()
            .skip(page.offset)
            .take(page.limit)
            .map(|chunk| ChunkRecord {
                id: chunk.source.id.clone(),
                document: chunk.source.content.clone(),
                metadata: chunk.source.metadata.clone(),
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), RetrievalError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.chunks.write().await.retain(|chunk| chunk.source.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(doc_id: &str) -> SourceMetadata {
        SourceMetadata {
            doc_id: Some(doc_id.to_string()),
            ..Default::default()
        }
    }

    async fn seeded() -> StaticRetriever {
        let retriever = StaticRetriever::new();
        retriever.insert("Use a powered tug for heavy carts.", metadata("carts")).await;
        retriever.insert("Lower shelf heights to waist level.", metadata("shelves")).await;
        retriever.insert("Replace worn caster wheels.", metadata("carts")).await;
        retriever
    }

    #[tokio::test]
    async fn exact_text_ranks_first() {
        let retriever = seeded().await;
        let sources = retriever
            .retrieve(&RetrievalRequest::new("Lower shelf heights to waist level."))
            .await
            .unwrap();

        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].id, "chunk:1");
        assert!(sources[0].distance.unwrap() < 1e-4);
    }

    #[tokio::test]
    async fn honours_top_k_and_filter() {
        let retriever = seeded().await;
        let request = RetrievalRequest::new("carts")
            .with_top_k(1)
            .with_filter(json!({"docId": "carts"}));

        let sources = retriever.retrieve(&request).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].metadata.doc_id.as_deref(), Some("carts"));
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let retriever = StaticRetriever::new().with_failure(RetrievalError::Network("down".into()));
        let err = retriever.retrieve(&RetrievalRequest::new("q")).await.unwrap_err();
        assert_eq!(err, RetrievalError::Network("down".into()));
    }

    fn embedded(id: &str, content: &str) -> EmbeddedChunk {
        EmbeddedChunk {
            id: id.to_string(),
            content: content.to_string(),
            metadata: metadata("guide"),
            embedding: mock_embedding(content),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_chunks_with_the_same_id() {
        let store = StaticRetriever::new();
        store
            .upsert(vec![embedded("guide:0", "old"), embedded("guide:1", "keep")])
            .await
            .unwrap();
        store.upsert(vec![embedded("guide:0", "new")]).await.unwrap();

        let listed = store.list(ChunkPage::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "guide:0");
        assert_eq!(listed[0].document, "new");
    }

    #[tokio::test]
    async fn list_pages_through_chunks() {
        let store = seeded().await;
        let page = store.list(ChunkPage::new(Some(1), Some(1))).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "chunk:1");
        assert!(store.list(ChunkPage::new(None, Some(10))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_the_named_chunk() {
        let store = seeded().await;
        store.delete("chunk:1").await.unwrap();
        store.delete("missing").await.unwrap();
        assert_eq!(store.ids().await, vec!["chunk:0", "chunk:2"]);
    }

    #[tokio::test]
    async fn upserted_chunks_are_retrievable() {
        let store = StaticRetriever::new();
        store.upsert(vec![embedded("guide:0", "Fit larger wheels.")]).await.unwrap();
        let sources = store
            .retrieve(&RetrievalRequest::new("Fit larger wheels."))
            .await
            .unwrap();
        assert_eq!(sources[0].id, "guide:0");
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let retriever = StaticRetriever::new();
        assert!(retriever.is_empty().await);
        assert!(retriever.retrieve(&RetrievalRequest::new("q")).await.unwrap().is_empty());
    }
}
