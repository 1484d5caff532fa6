//! Retrieval Adapters.
//!
//! Implementations of the SolutionRetriever and DocumentStore ports.
//!
//! ## Available Adapters
//!
//! - `ChromaRetriever` - Chroma vector store over HTTP
//! - `StaticRetriever` - In-memory chunks for tests and offline runs

mod chroma;
mod in_memory;

pub use chroma::{
    find_collection_id, normalize_chroma_listing, normalize_chroma_result, parse_body,
    ChromaConfig, ChromaRetriever, CollectionCache, DEFAULT_API_PREFIX, DEFAULT_COLLECTION,
};
pub use in_memory::StaticRetriever;
