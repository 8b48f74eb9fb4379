//! Chunk retrieval seam
//!
//! The engine never fetches documents itself. A [`ChunkStore`] hands over
//! every stored chunk keyed by source document, and [`document_groups`]
//! turns the caller's selection into [`DocumentGroup`]s.

use std::collections::BTreeMap;

use anyhow::Result;
use shared_types::{Chunk, DocumentGroup};
use tracing::{debug, warn};

/// Prefix upload staging puts on source ids before a document is committed
const STAGING_PREFIX: &str = "temp_";

pub trait ChunkStore {
    /// All stored chunks, keyed by source document id
    fn chunks_by_source(&self) -> Result<BTreeMap<String, Vec<Chunk>>>;
}

/// Strip the upload staging prefix from a source id
pub fn resolve_source_id(source_document_id: &str) -> &str {
    source_document_id
        .strip_prefix(STAGING_PREFIX)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(source_document_id)
}

/// Build document groups for `sources`, in the order given.
///
/// Sources are matched after staging prefixes are stripped on both sides.
/// Unknown sources are skipped with a warning; a known source whose chunk
/// list is empty yields an empty group.
pub fn document_groups(store: &dyn ChunkStore, sources: &[&str]) -> Result<Vec<DocumentGroup>> {
    let mut by_source: BTreeMap<String, Vec<Chunk>> = BTreeMap::new();
    for (source, chunks) in store.chunks_by_source()? {
        let resolved = resolve_source_id(&source).to_string();
        let entry = by_source.entry(resolved.clone()).or_default();
        entry.extend(chunks.into_iter().map(|mut chunk| {
            chunk.source_document_id = resolved.clone();
            chunk
        }));
    }

    let mut groups: Vec<DocumentGroup> = Vec::with_capacity(sources.len());
    for source in sources {
        let resolved = resolve_source_id(source);
        if groups.iter().any(|g| g.source_document_id == resolved) {
            debug!("Ignoring repeated source {}", resolved);
            continue;
        }
        match by_source.get(resolved) {
            Some(chunks) => groups.push(DocumentGroup::new(resolved, chunks.clone())),
            None => warn!("No chunks stored for source {}, skipping", resolved),
        }
    }

    Ok(groups)
}

/// In-process store for plain-text documents.
///
/// Text is split into paragraph chunks on blank lines; chunk ids are
/// `<source>#<n>` with `n` the paragraph position.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChunkStore {
    documents: BTreeMap<String, Vec<Chunk>>,
}

impl InMemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` under `source`, replacing any previous content.
    /// Returns the number of chunks stored.
    pub fn ingest(&mut self, source: &str, text: &str) -> usize {
        let source = resolve_source_id(source).to_string();
        let chunks: Vec<Chunk> = paragraphs(text)
            .into_iter()
            .enumerate()
            .map(|(n, paragraph)| {
                Chunk::new(format!("{}#{}", source, n), source.as_str(), paragraph, n as u32)
            })
            .collect();
        let count = chunks.len();
        debug!("Ingested {} chunks for {}", count, source);
        self.documents.insert(source, chunks);
        count
    }

    pub fn sources(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }
}

impl ChunkStore for InMemoryChunkStore {
    fn chunks_by_source(&self) -> Result<BTreeMap<String, Vec<Chunk>>> {
        Ok(self.documents.clone())
    }
}

/// Blank-line separated paragraphs, with surrounding whitespace trimmed
fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}
