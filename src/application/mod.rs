//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The turn command writes new session state and ingestion writes to the
//! document store; retrieval, answering and chunk listing only read.

pub mod handlers;

pub use handlers::{
    AnswerQueryError, AnswerQueryHandler, AnswerQueryResult, ChunkCatalogHandler,
    HandleTurnCommand, HandleTurnError, HandleTurnHandler, HandleTurnResult,
    IngestDocumentCommand, IngestDocumentHandler, IngestDocumentResult, IngestError,
    RetrieveSourcesHandler, QUERY_TOP_K,
};
