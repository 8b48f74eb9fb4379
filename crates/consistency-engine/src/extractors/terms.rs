// Term occurrence extraction for cross-document comparison
use serde::{Deserialize, Serialize};
use shared_types::Chunk;

use super::numeric::CURRENCY_OCCURRENCE;
use crate::normalizer::{normalize, Glossary};

/// A term as found in one chunk, with its canonical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOccurrence {
    pub surface_form: String,
    pub canonical_key: String,
    pub source_document_id: String,
    pub chunk_id: String,
}

/// Extracts glossary terms and money/rate literals from a chunk, in text order.
///
/// Only configured terms of interest are considered; free text outside the
/// glossary is never clustered.
pub fn extract_terms(chunk: &Chunk, glossary: &Glossary) -> Vec<TermOccurrence> {
    let text = chunk.raw_text.as_str();
    let mut spans: Vec<(usize, usize)> = Vec::new();

    if let Some(pattern) = glossary.term_pattern() {
        spans.extend(pattern.find_iter(text).map(|m| (m.start(), m.end())));
    }
    spans.extend(CURRENCY_OCCURRENCE.find_iter(text).map(|m| (m.start(), m.end())));

    // Earliest start wins; on a tie the longer span wins
    spans.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

    let mut occurrences = Vec::new();
    let mut last_end = 0;
    for (start, end) in spans {
        if start < last_end {
            continue;
        }
        last_end = end;

        let surface_form = text[start..end].split_whitespace().collect::<Vec<_>>().join(" ");
        let canonical_key = normalize(&surface_form, glossary);
        if canonical_key.is_empty() {
            continue;
        }

        occurrences.push(TermOccurrence {
            surface_form,
            canonical_key,
            source_document_id: chunk.source_document_id.clone(),
            chunk_id: chunk.id.clone(),
        });
    }

    occurrences
}
