//! Error types for consistency analysis

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("At least 2 non-empty documents are required for comparison (found {found})")]
    InsufficientDocuments { found: usize },

    #[error("Document '{source_document_id}' has no chunks and was excluded from comparison")]
    EmptyChunk { source_document_id: String },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Comparison cancelled")]
    Cancelled,

    #[error("Chunk '{chunk_id}' belongs to '{found}' but was grouped under '{expected}'")]
    ChunkSourceMismatch {
        chunk_id: String,
        expected: String,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
