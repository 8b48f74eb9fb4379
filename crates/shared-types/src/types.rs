//! Document data shared between the consistency engine and its collaborators

use serde::{Deserialize, Serialize};

/// A retrieved slice of a source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub source_document_id: String,
    pub raw_text: String,
    pub position: u32, // Order within the source document
}

impl Chunk {
    pub fn new(
        id: impl Into<String>,
        source_document_id: impl Into<String>,
        raw_text: impl Into<String>,
        position: u32,
    ) -> Self {
        Self {
            id: id.into(),
            source_document_id: source_document_id.into(),
            raw_text: raw_text.into(),
            position,
        }
    }
}

/// All chunks of one source document, in position order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentGroup {
    pub source_document_id: String,
    pub chunks: Vec<Chunk>,
}

impl DocumentGroup {
    /// Build a group, ordering chunks by position (ties broken by chunk id)
    pub fn new(source_document_id: impl Into<String>, mut chunks: Vec<Chunk>) -> Self {
        chunks.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Self {
            source_document_id: source_document_id.into(),
            chunks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}
