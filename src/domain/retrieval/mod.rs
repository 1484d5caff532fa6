//! Retrieval Module - solution-database queries and their results.
//!
//! The store itself sits behind the `SolutionRetriever` and `DocumentStore`
//! ports; this module defines the shapes that cross them, the prompt context
//! built from results, and the splitter that turns documents into chunks.

mod chunking;
mod document;
mod request;
mod source;

pub use chunking::{TextChunk, TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use document::{
    chunk_id, chunk_metadata, ChunkPage, ChunkRecord, EmbeddedChunk, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
pub use request::{RetrievalRequest, DEFAULT_TOP_K, MAX_TOP_K};
pub use source::{build_context_block, filter_by_distance, RetrievedSource, SourceMetadata};
