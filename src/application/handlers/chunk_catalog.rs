//! Chunk catalog handler.
//!
//! Pages through and removes stored chunks so the solution database can be
//! inspected and cleaned up by hand.

use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::retrieval::{ChunkPage, ChunkRecord};
use crate::ports::{DocumentStore, RetrievalError};

#[derive(Clone)]
pub struct ChunkCatalogHandler {
    store: Arc<dyn DocumentStore>,
}

impl ChunkCatalogHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: ChunkPage) -> Result<Vec<ChunkRecord>, RetrievalError> {
        let records = self.store.list(page).await?;
        tracing::debug!(count = records.len(), limit = page.limit, offset = page.offset, "Listed chunks");
        Ok(records)
    }

    pub async fn delete(&self, id: &str) -> Result<(), RetrievalError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::missing_field("id").into());
        }
        self.store.delete(id).await
    }
}
