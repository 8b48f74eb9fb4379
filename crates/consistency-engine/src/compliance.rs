//! Per-document compliance scores
//!
//! Scores produced for single documents are blended into the overall score.
//! The engine only consumes them through [`SingleDocumentAnalyzer`].

use anyhow::{anyhow, Result};
use shared_types::DocumentGroup;
use tracing::{debug, warn};

use crate::cancellation::CancellationToken;
use crate::clusterer::VariationScope;
use crate::comparator::{analyze_chunks, fold_findings, ComparisonFindings};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::scoring::{score, DocumentCompliance};

pub trait SingleDocumentAnalyzer {
    /// Compliance score in [0, 100] for one document
    fn analyze(&self, source_document_id: &str) -> Result<f64>;
}

/// Scores each document against itself: any concept phrased two ways, or
/// any formatting category styled two ways, inside one document counts
/// as an issue.
pub struct SelfConsistencyAnalyzer<'a> {
    config: &'a EngineConfig,
    groups: &'a [DocumentGroup],
    cancel: CancellationToken,
}

impl<'a> SelfConsistencyAnalyzer<'a> {
    pub fn new(config: &'a EngineConfig, groups: &'a [DocumentGroup]) -> Self {
        Self {
            config,
            groups,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort per-document analysis when `cancel` fires
    pub fn with_cancel(mut self, cancel: &CancellationToken) -> Self {
        self.cancel = cancel.clone();
        self
    }

    /// Intra-document findings for one document
    pub fn findings(&self, source_document_id: &str) -> Result<ComparisonFindings> {
        let group = self
            .groups
            .iter()
            .find(|g| g.source_document_id == source_document_id)
            .ok_or_else(|| anyhow!("unknown document {}", source_document_id))?;

        let analyses = analyze_chunks(&[group], self.config, &self.cancel)?;
        Ok(fold_findings(
            &analyses,
            1,
            VariationScope::SingleDocument,
            self.config.max_example_chunks,
        ))
    }
}

impl SingleDocumentAnalyzer for SelfConsistencyAnalyzer<'_> {
    fn analyze(&self, source_document_id: &str) -> Result<f64> {
        let findings = self.findings(source_document_id)?;
        let scores = score(&findings, &self.config.scoring);
        debug!(
            "Self-consistency of {}: {} issues, score {:.1}",
            source_document_id, scores.total_issues, scores.cross_document_score
        );
        Ok(scores.cross_document_score)
    }
}

/// Ask `analyzer` for each group's score; failures are logged and omitted.
///
/// `cancel` is checked around every document, so a cancelled run stops at
/// the next document boundary with [`EngineError::Cancelled`].
pub fn collect_compliance(
    analyzer: &dyn SingleDocumentAnalyzer,
    groups: &[DocumentGroup],
    cancel: &CancellationToken,
) -> crate::error::Result<Vec<DocumentCompliance>> {
    let mut scores = Vec::new();
    for group in groups.iter().filter(|g| !g.is_empty()) {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        match analyzer.analyze(&group.source_document_id) {
            Ok(score) => scores.push(DocumentCompliance {
                source_document_id: group.source_document_id.clone(),
                score,
            }),
            Err(e) => warn!(
                "Compliance analysis failed for {}: {:#}",
                group.source_document_id, e
            ),
        }
    }
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    Ok(scores)
}
