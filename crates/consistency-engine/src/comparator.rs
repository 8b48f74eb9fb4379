//! Cross-document comparison
//!
//! Runs term extraction, normalization and formatting detection over every
//! chunk of every document, then folds the per-chunk results into
//! [`ComparisonFindings`]. Chunks are processed in parallel, but results are
//! always folded in one fixed traversal order (documents as supplied, chunks
//! by position), so the findings never depend on scheduling.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared_types::{Chunk, DocumentGroup};
use tracing::{debug, info, instrument, warn};

use crate::cancellation::CancellationToken;
use crate::clusterer::{cluster, TermVariationGroup, VariationScope};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::extractors::{extract_terms, TermOccurrence};
use crate::formatting::{detect, FormattingCategory, FormattingSignature};

/// How one pattern key is used across the compared documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternUsage {
    pub pattern_key: String,
    pub count: usize,
    pub example_chunk_ids: Vec<String>,
    pub source_document_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingInconsistency {
    pub category: FormattingCategory,
    pub patterns: Vec<PatternUsage>,
}

/// Result of one comparison pass, before scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonFindings {
    pub documents_compared: usize,
    pub total_chunks_analyzed: usize,
    pub term_variation_groups: Vec<TermVariationGroup>,
    pub formatting_inconsistencies: Vec<FormattingInconsistency>,
    /// Documents excluded because they had no chunks
    pub skipped_documents: Vec<String>,
}

impl ComparisonFindings {
    pub fn empty(documents_compared: usize, total_chunks_analyzed: usize) -> Self {
        Self {
            documents_compared,
            total_chunks_analyzed,
            term_variation_groups: Vec::new(),
            formatting_inconsistencies: Vec::new(),
            skipped_documents: Vec::new(),
        }
    }

    pub fn total_issues(&self) -> usize {
        self.term_variation_groups.len() + self.formatting_inconsistencies.len()
    }
}

/// Terms and formatting signatures found in one chunk
#[derive(Debug, Clone, Default)]
pub(crate) struct ChunkAnalysis {
    pub terms: Vec<TermOccurrence>,
    pub signatures: Vec<FormattingSignature>,
}

/// Compare at least two documents
pub fn compare(groups: &[DocumentGroup], config: &EngineConfig) -> Result<ComparisonFindings> {
    compare_with_cancel(groups, config, &CancellationToken::new())
}

/// Compare at least two documents, aborting with [`EngineError::Cancelled`]
/// if `cancel` fires before the findings are complete
#[instrument(skip_all, fields(documents = groups.len()))]
pub fn compare_with_cancel(
    groups: &[DocumentGroup],
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<ComparisonFindings> {
    check_chunk_sources(groups)?;

    let mut skipped_documents = Vec::new();
    let mut documents: Vec<&DocumentGroup> = Vec::new();
    for group in groups {
        if group.is_empty() {
            let warning = EngineError::EmptyChunk {
                source_document_id: group.source_document_id.clone(),
            };
            warn!("{}", warning);
            skipped_documents.push(group.source_document_id.clone());
        } else {
            documents.push(group);
        }
    }

    if documents.len() < 2 {
        return Err(EngineError::InsufficientDocuments {
            found: documents.len(),
        });
    }

    let analyses = analyze_chunks(&documents, config, cancel)?;
    let mut findings = fold_findings(
        &analyses,
        documents.len(),
        VariationScope::CrossDocument,
        config.max_example_chunks,
    );
    findings.skipped_documents = skipped_documents;

    info!(
        documents_compared = findings.documents_compared,
        total_chunks = findings.total_chunks_analyzed,
        term_groups = findings.term_variation_groups.len(),
        formatting_issues = findings.formatting_inconsistencies.len(),
        "Comparison complete"
    );

    Ok(findings)
}

fn check_chunk_sources(groups: &[DocumentGroup]) -> Result<()> {
    for group in groups {
        if let Some(chunk) = group
            .chunks
            .iter()
            .find(|c| c.source_document_id != group.source_document_id)
        {
            return Err(EngineError::ChunkSourceMismatch {
                chunk_id: chunk.id.clone(),
                expected: group.source_document_id.clone(),
                found: chunk.source_document_id.clone(),
            });
        }
    }
    Ok(())
}

/// Chunks in canonical traversal order: documents as given, chunks by position
fn traversal_order<'a>(documents: &[&'a DocumentGroup]) -> Vec<&'a Chunk> {
    documents
        .iter()
        .flat_map(|group| {
            let mut chunks: Vec<&Chunk> = group.chunks.iter().collect();
            chunks.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
            chunks
        })
        .collect()
}

/// Analyze every chunk in parallel; the result keeps traversal order
pub(crate) fn analyze_chunks(
    documents: &[&DocumentGroup],
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ChunkAnalysis>> {
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    let chunks = traversal_order(documents);
    debug!(
        "Analyzing {} chunks across {} documents",
        chunks.len(),
        documents.len()
    );

    let analyses: Vec<Option<ChunkAnalysis>> = chunks
        .par_iter()
        .map(|chunk| {
            if cancel.is_cancelled() {
                return None;
            }
            Some(ChunkAnalysis {
                terms: extract_terms(chunk, &config.glossary),
                signatures: detect(chunk, &config.grammar),
            })
        })
        .collect();

    if cancel.is_cancelled() {
        debug!("Comparison cancelled after chunk analysis");
        return Err(EngineError::Cancelled);
    }

    analyses
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or(EngineError::Cancelled)
}

/// Fold per-chunk analyses (in traversal order) into findings
pub(crate) fn fold_findings(
    analyses: &[ChunkAnalysis],
    documents_compared: usize,
    scope: VariationScope,
    max_example_chunks: usize,
) -> ComparisonFindings {
    let occurrences: Vec<TermOccurrence> = analyses
        .iter()
        .flat_map(|a| a.terms.iter().cloned())
        .collect();
    let signatures: Vec<&FormattingSignature> =
        analyses.iter().flat_map(|a| a.signatures.iter()).collect();

    let term_variation_groups = cluster(&occurrences, scope);
    debug!(
        "{} term occurrences, {} inconsistent groups",
        occurrences.len(),
        term_variation_groups.len()
    );

    ComparisonFindings {
        documents_compared,
        total_chunks_analyzed: analyses.len(),
        term_variation_groups,
        formatting_inconsistencies: aggregate_formatting(&signatures, scope, max_example_chunks),
        skipped_documents: Vec::new(),
    }
}

struct CategoryUsage {
    category: FormattingCategory,
    patterns: Vec<PatternUsage>,
    keys_by_document: Vec<(String, BTreeSet<String>)>,
}

impl CategoryUsage {
    fn is_inconsistent(&self, scope: VariationScope) -> bool {
        if self.patterns.len() < 2 {
            return false;
        }
        match scope {
            VariationScope::SingleDocument => true,
            VariationScope::CrossDocument => self
                .keys_by_document
                .windows(2)
                .any(|pair| pair[0].1 != pair[1].1),
        }
    }
}

/// Group signatures by category and exact pattern key, in first-seen order
fn aggregate_formatting(
    signatures: &[&FormattingSignature],
    scope: VariationScope,
    max_example_chunks: usize,
) -> Vec<FormattingInconsistency> {
    let mut categories: Vec<CategoryUsage> = Vec::new();
    let mut index: HashMap<FormattingCategory, usize> = HashMap::new();

    for signature in signatures {
        let slot = *index.entry(signature.category).or_insert_with(|| {
            categories.push(CategoryUsage {
                category: signature.category,
                patterns: Vec::new(),
                keys_by_document: Vec::new(),
            });
            categories.len() - 1
        });
        let usage = &mut categories[slot];

        let existing = usage
            .patterns
            .iter()
            .position(|p| p.pattern_key == signature.pattern_key);
        let pattern = match existing {
            Some(i) => &mut usage.patterns[i],
            None => {
                usage.patterns.push(PatternUsage {
                    pattern_key: signature.pattern_key.clone(),
                    count: 0,
                    example_chunk_ids: Vec::new(),
                    source_document_ids: Vec::new(),
                });
                let last = usage.patterns.len() - 1;
                &mut usage.patterns[last]
            }
        };
        pattern.count += 1;
        if pattern.example_chunk_ids.len() < max_example_chunks
            && !pattern.example_chunk_ids.contains(&signature.chunk_id)
        {
            pattern.example_chunk_ids.push(signature.chunk_id.clone());
        }
        if !pattern
            .source_document_ids
            .contains(&signature.source_document_id)
        {
            pattern
                .source_document_ids
                .push(signature.source_document_id.clone());
        }

        match usage
            .keys_by_document
            .iter_mut()
            .find(|(doc, _)| doc == &signature.source_document_id)
        {
            Some((_, keys)) => {
                keys.insert(signature.pattern_key.clone());
            }
            None => usage.keys_by_document.push((
                signature.source_document_id.clone(),
                BTreeSet::from([signature.pattern_key.clone()]),
            )),
        }
    }

    categories
        .into_iter()
        .filter(|usage| usage.is_inconsistent(scope))
        .map(|usage| FormattingInconsistency {
            category: usage.category,
            patterns: usage.patterns,
        })
        .collect()
}
