//! Consistency scoring
//!
//! Scores are a pure function of finding counts and [`ScoringConfig`]:
//!
//! ```text
//! capacity      = document_baseline * max(documents_compared, 1)
//!               + chunk_weight * total_chunks_analyzed       (1 when <= 0)
//! issue_weight  = clamp(total_issues / capacity, 0, 1)
//! cross_score   = 100 * (1 - issue_weight)
//! overall_score = weighted mean of cross_score and mean(compliance scores)
//! ```

use serde::{Deserialize, Serialize};

use crate::comparator::ComparisonFindings;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Issues each compared document can absorb before the score bottoms out
    pub document_baseline: f64,
    /// Extra issue capacity per analyzed chunk
    pub chunk_weight: f64,
    pub cross_document_weight: f64,
    pub compliance_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            document_baseline: 5.0,
            chunk_weight: 0.5,
            cross_document_weight: 0.5,
            compliance_weight: 0.5,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("document_baseline", self.document_baseline),
            ("chunk_weight", self.chunk_weight),
            ("cross_document_weight", self.cross_document_weight),
            ("compliance_weight", self.compliance_weight),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "scoring.{} must be a non-negative number (found {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Compliance score produced for one document by a single-document analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCompliance {
    pub source_document_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub cross_document_score: f64,
    pub overall_score: f64,
    pub total_issues: usize,
}

/// Share of the issue capacity used up, in [0, 1]
pub fn issue_weight(
    total_issues: usize,
    documents_compared: usize,
    total_chunks_analyzed: usize,
    config: &ScoringConfig,
) -> f64 {
    let capacity = config.document_baseline * documents_compared.max(1) as f64
        + config.chunk_weight * total_chunks_analyzed as f64;
    let capacity = if capacity > 0.0 { capacity } else { 1.0 };

    let ratio = total_issues as f64 / capacity;
    if ratio.is_nan() {
        1.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Score from a weight, in [0, 100]
pub fn weight_to_score(weight: f64) -> f64 {
    (100.0 * (1.0 - weight)).clamp(0.0, 100.0)
}

fn usable_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Score findings without per-document compliance input
pub fn score(findings: &ComparisonFindings, config: &ScoringConfig) -> Scores {
    score_with_compliance(findings, config, &[])
}

/// Score findings, blending in externally supplied per-document compliance scores
pub fn score_with_compliance(
    findings: &ComparisonFindings,
    config: &ScoringConfig,
    compliance: &[DocumentCompliance],
) -> Scores {
    let total_issues = findings.total_issues();
    let weight = issue_weight(
        total_issues,
        findings.documents_compared,
        findings.total_chunks_analyzed,
        config,
    );
    let cross_document_score = weight_to_score(weight);

    let usable: Vec<f64> = compliance
        .iter()
        .map(|c| c.score)
        .filter(|s| s.is_finite())
        .map(|s| s.clamp(0.0, 100.0))
        .collect();

    let cross_weight = usable_weight(config.cross_document_weight);
    let compliance_weight = usable_weight(config.compliance_weight);

    let overall_score = if usable.is_empty() || cross_weight + compliance_weight <= 0.0 {
        cross_document_score
    } else {
        let compliance_mean = usable.iter().sum::<f64>() / usable.len() as f64;
        let blended = (cross_weight * cross_document_score + compliance_weight * compliance_mean)
            / (cross_weight + compliance_weight);
        blended.clamp(0.0, 100.0)
    };

    Scores {
        cross_document_score,
        overall_score,
        total_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings(issues: usize, documents: usize, chunks: usize) -> ComparisonFindings {
        let mut findings = ComparisonFindings::empty(documents, chunks);
        findings.term_variation_groups = (0..issues)
            .map(|i| crate::clusterer::TermVariationGroup {
                canonical_key: format!("term_{}", i),
                variations_by_document: Vec::new(),
            })
            .collect();
        findings
    }

    #[test]
    fn test_no_issues_scores_100() {
        let scores = score(&findings(0, 2, 4), &ScoringConfig::default());
        assert_eq!(scores.cross_document_score, 100.0);
        assert_eq!(scores.overall_score, 100.0);
        assert_eq!(scores.total_issues, 0);
    }

    #[test]
    fn test_formula_matches_stated_weights() {
        // capacity = 5 * 3 + 0.5 * 3 = 16.5
        let scores = score(&findings(6, 3, 3), &ScoringConfig::default());
        let expected = 100.0 * (1.0 - 6.0 / 16.5);
        assert!((scores.cross_document_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamps_at_zero_and_keeps_raw_issue_count() {
        let scores = score(&findings(500, 2, 2), &ScoringConfig::default());
        assert_eq!(scores.cross_document_score, 0.0);
        assert_eq!(scores.total_issues, 500);
    }

    #[test]
    fn test_zero_capacity_does_not_divide_by_zero() {
        let config = ScoringConfig {
            document_baseline: 0.0,
            chunk_weight: 0.0,
            ..ScoringConfig::default()
        };
        let scores = score(&findings(0, 0, 0), &config);
        assert_eq!(scores.cross_document_score, 100.0);
        let scores = score(&findings(1, 0, 0), &config);
        assert_eq!(scores.cross_document_score, 0.0);
    }

    #[test]
    fn test_overall_blends_compliance() {
        let compliance = vec![
            DocumentCompliance {
                source_document_id: "a".to_string(),
                score: 80.0,
            },
            DocumentCompliance {
                source_document_id: "b".to_string(),
                score: 60.0,
            },
        ];
        let scores = score_with_compliance(&findings(0, 2, 2), &ScoringConfig::default(), &compliance);
        assert!((scores.overall_score - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_overall_ignores_non_finite_and_clamps_out_of_range() {
        let compliance = vec![
            DocumentCompliance {
                source_document_id: "a".to_string(),
                score: f64::NAN,
            },
            DocumentCompliance {
                source_document_id: "b".to_string(),
                score: 250.0,
            },
        ];
        let scores = score_with_compliance(&findings(0, 2, 2), &ScoringConfig::default(), &compliance);
        assert_eq!(scores.overall_score, 100.0);
    }

    #[test]
    fn test_zero_weights_fall_back_to_cross_score() {
        let config = ScoringConfig {
            cross_document_weight: 0.0,
            compliance_weight: 0.0,
            ..ScoringConfig::default()
        };
        let compliance = vec![DocumentCompliance {
            source_document_id: "a".to_string(),
            score: 10.0,
        }];
        let scores = score_with_compliance(&findings(0, 2, 2), &config, &compliance);
        assert_eq!(scores.overall_score, scores.cross_document_score);
    }

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        let negative = ScoringConfig {
            chunk_weight: -1.0,
            ..ScoringConfig::default()
        };
        assert!(negative.validate().is_err());

        let nan = ScoringConfig {
            compliance_weight: f64::NAN,
            ..ScoringConfig::default()
        };
        assert!(nan.validate().is_err());
        assert!(ScoringConfig::default().validate().is_ok());
    }
}
