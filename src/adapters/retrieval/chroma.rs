//! Chroma Retriever - SolutionRetriever and DocumentStore over the Chroma v2
//! REST API.
//!
//! Queries are embedded through the configured [`LanguageModel`] and sent
//! as `query_embeddings`. Chunks are written with `upsert`, listed with
//! `get` and removed with `delete`. The collection id is resolved by name on first
//! use (created if missing) and kept in a [`CollectionCache`] owned by the
//! retriever.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::domain::retrieval::{
    filter_by_distance, ChunkPage, ChunkRecord, EmbeddedChunk, RetrievalRequest, RetrievedSource,
    SourceMetadata,
};
use crate::ports::{DocumentStore, LanguageModel, RetrievalError, SolutionRetriever};

pub const DEFAULT_API_PREFIX: &str = "/api/v2";
pub const DEFAULT_COLLECTION: &str = "test_docs";

/// Connection settings for a Chroma server.
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
    pub timeout: Duration,
    /// Distance cutoff applied when the request does not set one.
    pub min_similarity: Option<f64>,
}

impl ChromaConfig {
    pub fn new(
        base_url: impl Into<String>,
        tenant: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            tenant: tenant.into(),
            database: database.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            timeout: Duration::from_secs(30),
            min_similarity: None,
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: Option<f64>) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Full URL for an API path such as `/heartbeat`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn collections_path(&self) -> String {
        format!(
            "/tenants/{}/databases/{}/collections",
            self.tenant, self.database
        )
    }

    pub fn cache_key(&self) -> String {
        format!("{}::{}::{}", self.tenant, self.database, self.collection)
    }
}

/// Collection ids resolved so far, keyed by `tenant::database::collection`.
#[derive(Debug, Clone, Default)]
pub struct CollectionCache {
    ids: Arc<RwLock<HashMap<String, String>>>,
}

impl CollectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.ids.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: impl Into<String>, id: impl Into<String>) {
        self.ids.write().await.insert(key.into(), id.into());
    }

    pub async fn clear(&self) {
        self.ids.write().await.clear();
    }
}

/// [`SolutionRetriever`] backed by a Chroma collection.
pub struct ChromaRetriever {
    config: ChromaConfig,
    client: Client,
    embedder: Arc<dyn LanguageModel>,
    cache: CollectionCache,
}

impl ChromaRetriever {
    pub fn new(config: ChromaConfig, embedder: Arc<dyn LanguageModel>) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            embedder,
            cache: CollectionCache::new(),
        })
    }

    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Value, RetrievalError> {
        let url = self.config.url(path);
        tracing::debug!(%method, %url, "Chroma request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::Network(format!("{} {}: {}", method, url, e)))?;

        Self::read_json(response).await
    }

    async fn read_json(response: Response) -> Result<Value, RetrievalError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Store {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;
        parse_body(&text)
    }

    /// Liveness check against the server.
    pub async fn heartbeat(&self) -> Result<Value, RetrievalError> {
        self.send::<Value>(Method::GET, "/heartbeat", None).await
    }

    /// Resolves the configured collection's id, creating the collection if needed.
    pub async fn collection_id(&self) -> Result<String, RetrievalError> {
        let key = self.config.cache_key();
        if let Some(id) = self.cache.get(&key).await {
            return Ok(id);
        }

        let path = self.config.collections_path();
        let listed = self.send::<Value>(Method::GET, &path, None).await?;

        let id = match find_collection_id(&listed, &self.config.collection) {
            Some(id) => id,
            None => {
                tracing::info!(collection = %self.config.collection, "Creating Chroma collection");
                let body = json!({ "name": self.config.collection });
                let created = self.send(Method::POST, &path, Some(&body)).await?;
                created_collection_id(&created).ok_or_else(|| {
                    RetrievalError::Parse(format!("create collection did not return an id: {}", created))
                })?
            }
        };

        self.cache.insert(key, id.clone()).await;
        Ok(id)
    }

    /// Path of an operation on the configured collection, e.g. `upsert`.
    async fn collection_path(&self, operation: &str) -> Result<String, RetrievalError> {
        let collection_id = self.collection_id().await?;
        Ok(format!(
            "{}/{}/{}",
            self.config.collections_path(),
            collection_id,
            operation
        ))
    }
}

#[async_trait]
impl SolutionRetriever for ChromaRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<RetrievedSource>, RetrievalError> {
        request.validate()?;

        let vector = self.embedder.embed(&request.question).await?;
        let body = QueryBody {
            query_embeddings: vec![vector],
            n_results: request.top_k,
            filter: request.filter.as_ref(),
            include: &["documents", "metadatas", "distances"],
        };
        let path = self.collection_path("query").await?;
        let raw = self.send(Method::POST, &path, Some(&body)).await?;

        let sources = normalize_chroma_result(&raw);
        let cutoff = request.min_similarity.or(self.config.min_similarity);
        let sources = filter_by_distance(sources, cutoff);

        tracing::debug!(count = sources.len(), top_k = request.top_k, "Retrieved sources");
        Ok(sources)
    }
}

#[async_trait]
impl DocumentStore for ChromaRetriever {
    async fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> Result<(), RetrievalError> {
        if chunks.is_empty() {
            return Ok(());
        }
        let body = UpsertBody::from_chunks(chunks);
        let path = self.collection_path("upsert").await?;
        self.send(Method::POST, &path, Some(&body)).await?;
        tracing::debug!(count = body.ids.len(), "Upserted chunks");
        Ok(())
    }

    async fn list(&self, page: ChunkPage) -> Result<Vec<ChunkRecord>, RetrievalError> {
        let body = json!({
            "limit": page.limit,
            "offset": page.offset,
            "include": ["documents", "metadatas"],
        });
        let path = self.collection_path("get").await?;
        let raw = self.send(Method::POST, &path, Some(&body)).await?;
        Ok(normalize_chroma_listing(&raw))
    }

    async fn delete(&self, id: &str) -> Result<(), RetrievalError> {
        let body = json!({ "ids": [id] });
        let path = self.collection_path("delete").await?;
        self.send(Method::POST, &path, Some(&body)).await?;
        tracing::info!(%id, "Deleted chunk");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct UpsertBody {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<String>,
    metadatas: Vec<SourceMetadata>,
}

impl UpsertBody {
    fn from_chunks(chunks: Vec<EmbeddedChunk>) -> Self {
        let mut body = Self {
            ids: Vec::with_capacity(chunks.len()),
            embeddings: Vec::with_capacity(chunks.len()),
            documents: Vec::with_capacity(chunks.len()),
            metadatas: Vec::with_capacity(chunks.len()),
        };
        for chunk in chunks {
            body.ids.push(chunk.id);
            body.embeddings.push(chunk.embedding);
            body.documents.push(chunk.content);
            body.metadatas.push(chunk.metadata);
        }
        body
    }
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Value>,
    include: &'a [&'a str],
}

/// Parses a successful response body. An empty body reads as `null`.
pub fn parse_body(text: &str) -> Result<Value, RetrievalError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
        .map_err(|e| RetrievalError::Parse(format!("invalid JSON from Chroma: {}", e)))
}

/// Finds a collection by name in a list response.
///
/// Accepts a bare array or one wrapped in `data` / `collections`.
pub fn find_collection_id(listed: &Value, name: &str) -> Option<String> {
    let list = listed
        .as_array()
        .or_else(|| listed.get("data").and_then(Value::as_array))
        .or_else(|| listed.get("collections").and_then(Value::as_array))?;

    list.iter()
        .find(|c| c.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|c| c.get("id").and_then(Value::as_str))
        .map(str::to_string)
}

fn created_collection_id(created: &Value) -> Option<String> {
    created
        .get("id")
        .or_else(|| created.get("collection").and_then(|c| c.get("id")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Flattens Chroma's per-query nested arrays into sources for the first query.
pub fn normalize_chroma_result(raw: &Value) -> Vec<RetrievedSource> {
    let first = |key: &str| -> Vec<Value> {
        raw.get(key)
            .and_then(|v| v.get(0))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let ids = first("ids");
    let documents = first("documents");
    let metadatas = first("metadatas");
    let distances = first("distances");

    let n = ids
        .len()
        .max(documents.len())
        .max(metadatas.len())
        .max(distances.len());

    (0..n)
        .map(|i| RetrievedSource {
            id: ids
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("result:{}", i)),
            content: documents
                .get(i)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            metadata: metadatas
                .get(i)
                .map(SourceMetadata::from_json)
                .unwrap_or_default(),
            distance: distances.get(i).and_then(Value::as_f64),
        })
        .collect()
}

/// Reads a `get` response, whose arrays are flat rather than per query.
pub fn normalize_chroma_listing(raw: &Value) -> Vec<ChunkRecord> {
    let column = |key: &str| -> Vec<Value> {
        raw.get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };
    let documents = column("documents");
    let metadatas = column("metadatas");

    column("ids")
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            Some(ChunkRecord {
                id: id.as_str()?.to_string(),
                document: documents
                    .get(i)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                metadata: metadatas
                    .get(i)
                    .map(SourceMetadata::from_json)
                    .unwrap_or_default(),
            })
        })
        .collect()
}
