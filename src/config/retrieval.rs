//! Solution retrieval configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::retrieval::{ChromaConfig, DEFAULT_API_PREFIX, DEFAULT_COLLECTION};
use crate::domain::retrieval::{
    TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K, MAX_TOP_K,
};

/// Solution retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub provider: RetrievalProvider,

    /// Vector store base URL
    #[serde(default = "default_chroma_url")]
    pub chroma_url: String,

    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    #[serde(default = "default_tenant")]
    pub tenant: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Sources fetched per solution turn
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Distance cutoff applied when a request carries none
    #[serde(default)]
    pub min_similarity: Option<f64>,

    /// Store request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Characters per ingested chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters repeated between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

/// Retrieval backend type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalProvider {
    #[default]
    Chroma,
    /// In-process store, empty unless seeded
    Static,
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Chroma client settings derived from this section
    pub fn chroma(&self) -> ChromaConfig {
        ChromaConfig::new(&self.chroma_url, &self.tenant, &self.database)
            .with_api_prefix(&self.api_prefix)
            .with_collection(&self.collection)
            .with_timeout(self.timeout())
            .with_min_similarity(self.min_similarity)
    }

    /// Splitter used when ingesting documents
    pub fn splitter(&self) -> Result<TextSplitter, ValidationError> {
        TextSplitter::new(self.chunk_size, self.chunk_overlap)
            .map_err(|e| ValidationError::InvalidChunking(e.to_string()))
    }

    /// Validate retrieval configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == RetrievalProvider::Chroma {
            let url = self.chroma_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::InvalidUrl {
                    field: "CHROMA_URL",
                    value: self.chroma_url.clone(),
                });
            }
            if self.collection.trim().is_empty() {
                return Err(ValidationError::MissingRequired("COLLECTION"));
            }
        }
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(ValidationError::InvalidTopK {
                value: self.top_k,
                max: MAX_TOP_K,
            });
        }
        if let Some(cutoff) = self.min_similarity {
            if !cutoff.is_finite() || cutoff < 0.0 {
                return Err(ValidationError::InvalidMinSimilarity(cutoff));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.splitter()?;
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            provider: RetrievalProvider::default(),
            chroma_url: default_chroma_url(),
            api_prefix: default_api_prefix(),
            tenant: default_tenant(),
            database: default_database(),
            collection: default_collection(),
            top_k: default_top_k(),
            min_similarity: None,
            timeout_secs: default_timeout(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chroma_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_tenant() -> String {
    "default_tenant".to_string()
}

fn default_database() -> String {
    "default_database".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_timeout() -> u64 {
    30
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.provider, RetrievalProvider::Chroma);
        assert_eq!(config.collection, "test_docs");
        assert_eq!(config.top_k, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chroma_config_carries_settings() {
        let config = RetrievalConfig {
            collection: "solutions".to_string(),
            min_similarity: Some(0.8),
            ..Default::default()
        };
        let chroma = config.chroma();
        assert_eq!(chroma.collection, "solutions");
        assert_eq!(chroma.min_similarity, Some(0.8));
        assert_eq!(chroma.cache_key(), "default_tenant::default_database::solutions");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = RetrievalConfig {
            chroma_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidUrl { .. })));
    }

    #[test]
    fn test_static_provider_skips_url_check() {
        let config = RetrievalConfig {
            provider: RetrievalProvider::Static,
            chroma_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_top_k_bounds() {
        for top_k in [0, MAX_TOP_K + 1] {
            let config = RetrievalConfig {
                top_k,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ValidationError::InvalidTopK { .. })));
        }
    }

    #[test]
    fn test_chunking_defaults_and_overlap_check() {
        let config = RetrievalConfig::default();
        let splitter = config.splitter().unwrap();
        assert_eq!(splitter.chunk_size(), 200);
        assert_eq!(splitter.chunk_overlap(), 50);

        let config = RetrievalConfig {
            chunk_size: 50,
            chunk_overlap: 50,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidChunking(_))));
    }

    #[test]
    fn test_negative_min_similarity_rejected() {
        let config = RetrievalConfig {
            min_similarity: Some(-0.1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
