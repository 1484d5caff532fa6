//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod answer_query;
mod chunk_catalog;
mod handle_turn;
mod ingest_document;
mod retrieve_sources;

pub use answer_query::{grounded_question, AnswerQueryError, AnswerQueryHandler, AnswerQueryResult};
pub use chunk_catalog::ChunkCatalogHandler;
pub use handle_turn::{HandleTurnCommand, HandleTurnError, HandleTurnHandler, HandleTurnResult};
pub use ingest_document::{
    IngestDocumentCommand, IngestDocumentHandler, IngestDocumentResult, IngestError,
};
pub use retrieve_sources::{RetrieveSourcesHandler, QUERY_TOP_K};
