//! IngestDocument command handler.
//!
//! Text → chunks → embeddings → upsert into the document store.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::foundation::ErrorCode;
use crate::domain::retrieval::{chunk_id, chunk_metadata, EmbeddedChunk, TextSplitter};
use crate::ports::{AIError, DocumentStore, LanguageModel, RetrievalError};

/// Command to add a document to the solution database.
#[derive(Debug, Clone, Default)]
pub struct IngestDocumentCommand {
    pub text: String,
    /// Generated when absent or blank.
    pub doc_id: Option<String>,
    /// Extra metadata stored with every chunk.
    pub metadata: Map<String, Value>,
}

impl IngestDocumentCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestDocumentResult {
    pub doc_id: String,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("text (string) is required")]
    EmptyText,

    #[error("Embedding failed: {0}")]
    Embedding(#[from] AIError),

    #[error("Expected {expected} embeddings, got {actual}")]
    EmbeddingCount { expected: usize, actual: usize },

    #[error("Storing chunks failed: {0}")]
    Store(#[from] RetrievalError),
}

impl IngestError {
    pub fn code(&self) -> ErrorCode {
        match self {
            IngestError::EmptyText => ErrorCode::MissingField,
            IngestError::Embedding(_) | IngestError::EmbeddingCount { .. } => ErrorCode::AIProviderError,
            IngestError::Store(err) => err.code(),
        }
    }
}

#[derive(Clone)]
pub struct IngestDocumentHandler {
    embedder: Arc<dyn LanguageModel>,
    store: Arc<dyn DocumentStore>,
    splitter: TextSplitter,
}

impl IngestDocumentHandler {
    pub fn new(embedder: Arc<dyn LanguageModel>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            embedder,
            store,
            splitter: TextSplitter::default(),
        }
    }

    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub async fn handle(&self, cmd: IngestDocumentCommand) -> Result<IngestDocumentResult, IngestError> {
        let chunks = self.splitter.split(&cmd.text);
        if chunks.is_empty() {
            return Err(IngestError::EmptyText);
        }

        let doc_id = cmd
            .doc_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&contents).await?;
        if embeddings.len() != chunks.len() {
            return Err(IngestError::EmbeddingCount {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        let chunk_count = chunks.len();
        let embedded = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk {
                id: chunk_id(&doc_id, chunk.index),
                metadata: chunk_metadata(&doc_id, chunk.index, &cmd.metadata),
                content: chunk.content,
                embedding,
            })
            .collect();
        self.store.upsert(embedded).await?;

        tracing::info!(%doc_id, chunk_count, "Ingested document");
        Ok(IngestDocumentResult { doc_id, chunk_count })
    }
}
