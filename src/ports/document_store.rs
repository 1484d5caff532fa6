//! Document Store Port - writes, lists and removes solution chunks.
//!
//! The write side of the solution database. Queries go through
//! [`SolutionRetriever`](super::SolutionRetriever); both are usually
//! implemented by the same adapter.

use async_trait::async_trait;

use super::RetrievalError;
use crate::domain::retrieval::{ChunkPage, ChunkRecord, EmbeddedChunk};

/// Port for maintaining the chunks behind retrieval.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts chunks, replacing any stored under the same id.
    async fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> Result<(), RetrievalError>;

    /// Lists stored chunks in store order.
    async fn list(&self, page: ChunkPage) -> Result<Vec<ChunkRecord>, RetrievalError>;

    /// Removes a chunk. Unknown ids are not an error.
    async fn delete(&self, id: &str) -> Result<(), RetrievalError>;
}
