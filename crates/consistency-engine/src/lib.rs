pub mod cancellation;
pub mod clusterer;
pub mod comparator;
pub mod compliance;
pub mod config;
pub mod error;
pub mod extractors;
pub mod formatting;
pub mod normalizer;
pub mod patterns;
pub mod report;
pub mod scoring;
pub mod store;

pub use cancellation::CancellationToken;
pub use clusterer::{TermVariationGroup, VariationScope};
pub use comparator::{ComparisonFindings, FormattingInconsistency, PatternUsage};
pub use compliance::{SelfConsistencyAnalyzer, SingleDocumentAnalyzer};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use formatting::{FormattingCategory, FormattingSignature};
pub use normalizer::{normalize, Glossary, GlossaryEntry};
pub use report::{ConsistencyRating, Report};
pub use scoring::{DocumentCompliance, Scores, ScoringConfig};
pub use store::{document_groups, ChunkStore, InMemoryChunkStore};

use shared_types::DocumentGroup;
use tracing::info;

/// ConsistencyEngine entry point
pub struct ConsistencyEngine {
    config: EngineConfig,
}

impl ConsistencyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compare two or more documents
    pub fn compare(&self, groups: &[DocumentGroup]) -> Result<ComparisonFindings> {
        comparator::compare(groups, &self.config)
    }

    pub fn score(&self, findings: &ComparisonFindings) -> Scores {
        scoring::score(findings, &self.config.scoring)
    }

    /// Compare, score and assemble a report without compliance input
    pub fn analyze(&self, groups: &[DocumentGroup]) -> Result<Report> {
        self.analyze_with(groups, None, &CancellationToken::new())
    }

    /// Full analysis, blending in `analyzer`'s per-document scores when given
    pub fn analyze_with(
        &self,
        groups: &[DocumentGroup],
        analyzer: Option<&dyn SingleDocumentAnalyzer>,
        cancel: &CancellationToken,
    ) -> Result<Report> {
        let findings = comparator::compare_with_cancel(groups, &self.config, cancel)?;

        let document_compliance = match analyzer {
            Some(analyzer) => compliance::collect_compliance(analyzer, groups, cancel)?,
            None => Vec::new(),
        };

        let scores =
            scoring::score_with_compliance(&findings, &self.config.scoring, &document_compliance);
        info!(
            total_issues = scores.total_issues,
            cross_document_score = scores.cross_document_score,
            overall_score = scores.overall_score,
            "Analysis complete"
        );

        Ok(report::assemble(findings, scores, document_compliance))
    }
}

impl Default for ConsistencyEngine {
    fn default() -> Self {
        Self::new(EngineConfig::builtin())
    }
}

/// Compare with an explicit configuration
pub fn compare(groups: &[DocumentGroup], config: &EngineConfig) -> Result<ComparisonFindings> {
    comparator::compare(groups, config)
}

/// Score findings under `config`'s scoring parameters
pub fn score(findings: &ComparisonFindings, config: &EngineConfig) -> Scores {
    scoring::score(findings, &config.scoring)
}

/// Compare, score and report in one call
pub fn analyze(groups: &[DocumentGroup], config: &EngineConfig) -> Result<Report> {
    ConsistencyEngine::new(config.clone()).analyze(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Chunk, Severity};

    fn group(id: &str, text: &str) -> DocumentGroup {
        DocumentGroup::new(id, vec![Chunk::new(format!("{}#0", id), id, text, 0)])
    }

    #[test]
    fn test_engine_detects_role_variation() {
        let engine = ConsistencyEngine::default();
        let findings = engine
            .compare(&[
                group("a", "The Attorney shall advise the Client."),
                group("b", "The Lawyer shall advise the Client."),
            ])
            .unwrap();

        assert_eq!(findings.term_variation_groups.len(), 1);
        assert_eq!(findings.term_variation_groups[0].canonical_key, "counsel_role");
    }

    #[test]
    fn test_engine_ignores_plural_inflection() {
        let findings = ConsistencyEngine::default()
            .compare(&[
                group("a", "The attorney shall advise."),
                group("b", "The attorneys shall advise."),
            ])
            .unwrap();
        assert!(findings.term_variation_groups.is_empty());
    }

    #[test]
    fn test_engine_accepts_identical_documents() {
        let text = "Section 1. Services\n- The attorney bills $300 per hour.";
        let report = ConsistencyEngine::default()
            .analyze(&[group("a", text), group("b", text)])
            .unwrap();

        assert_eq!(report.scores.total_issues, 0);
        assert_eq!(report.scores.cross_document_score, 100.0);
        assert_eq!(report.rating, ConsistencyRating::Excellent);
    }

    #[test]
    fn test_engine_reports_three_forms_as_critical() {
        let report = ConsistencyEngine::default()
            .analyze(&[
                group("a", "The attorney."),
                group("b", "The lawyer."),
                group("c", "The legal counsel."),
            ])
            .unwrap();

        assert_eq!(report.terminology_issues.len(), 1);
        assert_eq!(report.terminology_issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_analyze_with_blends_self_consistency() {
        let engine = ConsistencyEngine::default();
        let groups = vec![
            group("a", "The attorney and the lawyer."),
            group("b", "The attorney."),
        ];
        let cancel = CancellationToken::new();
        let analyzer = SelfConsistencyAnalyzer::new(engine.config(), &groups).with_cancel(&cancel);
        let report = engine
            .analyze_with(&groups, Some(&analyzer), &cancel)
            .unwrap();

        assert_eq!(report.document_compliance.len(), 2);
        assert!(report.document_compliance[0].score < 100.0);
        assert_eq!(report.document_compliance[1].score, 100.0);
        let compliance_mean = (report.document_compliance[0].score + 100.0) / 2.0;
        let expected = (report.scores.cross_document_score + compliance_mean) / 2.0;
        assert!((report.scores.overall_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_free_functions_match_engine() {
        let config = EngineConfig::builtin();
        let groups = vec![group("a", "- item"), group("b", "• item")];
        let findings = compare(&groups, &config).unwrap();
        assert_eq!(findings, ConsistencyEngine::default().compare(&groups).unwrap());
        assert_eq!(score(&findings, &config).total_issues, 1);
        assert_eq!(analyze(&groups, &config).unwrap().findings, findings);
    }
}
