//! Report assembly
//!
//! Packages findings and scores into the serializable result handed back to
//! callers. Nothing here re-derives counts; the flattened issue lists are
//! views over the findings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::Severity;

use crate::comparator::{ComparisonFindings, PatternUsage};
use crate::formatting::FormattingCategory;
use crate::scoring::{DocumentCompliance, Scores};

/// Term groups with at least this many distinct forms are critical
const CRITICAL_FORM_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ConsistencyRating {
    pub fn from_issue_count(total_issues: usize) -> Self {
        match total_issues {
            0 => ConsistencyRating::Excellent,
            1..=4 => ConsistencyRating::Good,
            5..=9 => ConsistencyRating::Fair,
            _ => ConsistencyRating::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyRating::Excellent => "excellent",
            ConsistencyRating::Good => "good",
            ConsistencyRating::Fair => "fair",
            ConsistencyRating::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminologyIssue {
    pub canonical_key: String,
    pub variations_found: Vec<String>,
    pub affected_documents: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingIssue {
    pub category: FormattingCategory,
    pub patterns_found: Vec<String>,
    pub affected_documents: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: String,
    pub summary: String,
    pub rating: ConsistencyRating,
    pub scores: Scores,
    pub findings: ComparisonFindings,
    pub terminology_issues: Vec<TerminologyIssue>,
    pub formatting_issues: Vec<FormattingIssue>,
    pub issues_by_severity: SeverityCounts,
    pub document_compliance: Vec<DocumentCompliance>,
}

/// Assemble a report stamped with the current time
pub fn assemble(
    findings: ComparisonFindings,
    scores: Scores,
    document_compliance: Vec<DocumentCompliance>,
) -> Report {
    assemble_at(findings, scores, document_compliance, Utc::now())
}

/// Assemble a report with an explicit timestamp
pub fn assemble_at(
    findings: ComparisonFindings,
    scores: Scores,
    document_compliance: Vec<DocumentCompliance>,
    generated_at: DateTime<Utc>,
) -> Report {
    let terminology_issues: Vec<TerminologyIssue> = findings
        .term_variation_groups
        .iter()
        .map(|group| {
            let variations_found: Vec<String> = group
                .distinct_surface_forms()
                .into_iter()
                .map(String::from)
                .collect();
            let severity = if variations_found.len() >= CRITICAL_FORM_COUNT {
                Severity::Critical
            } else {
                Severity::Warning
            };
            TerminologyIssue {
                canonical_key: group.canonical_key.clone(),
                variations_found,
                affected_documents: group.document_ids().into_iter().map(String::from).collect(),
                severity,
            }
        })
        .collect();

    let formatting_issues: Vec<FormattingIssue> = findings
        .formatting_inconsistencies
        .iter()
        .map(|inconsistency| FormattingIssue {
            category: inconsistency.category,
            patterns_found: inconsistency
                .patterns
                .iter()
                .map(|p| p.pattern_key.clone())
                .collect(),
            affected_documents: affected_documents(&inconsistency.patterns),
            severity: Severity::Info,
        })
        .collect();

    let mut issues_by_severity = SeverityCounts::default();
    for issue in &terminology_issues {
        issues_by_severity.record(issue.severity);
    }
    for issue in &formatting_issues {
        issues_by_severity.record(issue.severity);
    }

    let rating = ConsistencyRating::from_issue_count(scores.total_issues);
    let summary = summarize(&findings, &scores, rating);

    Report {
        generated_at: generated_at.to_rfc3339(),
        summary,
        rating,
        scores,
        findings,
        terminology_issues,
        formatting_issues,
        issues_by_severity,
        document_compliance,
    }
}

/// Union of the documents using any of the patterns, first-seen order
fn affected_documents(patterns: &[PatternUsage]) -> Vec<String> {
    let mut documents: Vec<String> = Vec::new();
    for id in patterns.iter().flat_map(|p| p.source_document_ids.iter()) {
        if !documents.contains(id) {
            documents.push(id.clone());
        }
    }
    documents
}

fn summarize(findings: &ComparisonFindings, scores: &Scores, rating: ConsistencyRating) -> String {
    let mut summary = format!(
        "Compared {} documents ({} chunks): {} terminology and {} formatting inconsistencies, \
         cross-document score {:.1}/100 ({}).",
        findings.documents_compared,
        findings.total_chunks_analyzed,
        findings.term_variation_groups.len(),
        findings.formatting_inconsistencies.len(),
        scores.cross_document_score,
        rating.as_str()
    );
    if !findings.skipped_documents.is_empty() {
        summary.push_str(&format!(
            " Skipped {} empty document(s).",
            findings.skipped_documents.len()
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusterer::{DocumentVariations, TermVariationGroup};
    use crate::comparator::FormattingInconsistency;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn term_group(key: &str, forms: &[(&str, &str)]) -> TermVariationGroup {
        TermVariationGroup {
            canonical_key: key.to_string(),
            variations_by_document: forms
                .iter()
                .map(|(doc, form)| DocumentVariations {
                    source_document_id: doc.to_string(),
                    surface_forms: vec![form.to_string()],
                })
                .collect(),
        }
    }

    fn usage(key: &str, docs: &[&str]) -> PatternUsage {
        PatternUsage {
            pattern_key: key.to_string(),
            count: docs.len(),
            example_chunk_ids: docs.iter().map(|d| format!("{}#0", d)).collect(),
            source_document_ids: docs.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn sample_findings() -> ComparisonFindings {
        let mut findings = ComparisonFindings::empty(3, 9);
        findings.term_variation_groups = vec![
            term_group(
                "counsel_role",
                &[("a", "attorney"), ("b", "lawyer"), ("c", "legal counsel")],
            ),
            term_group("party_role", &[("a", "Client"), ("c", "Party")]),
        ];
        findings.formatting_inconsistencies = vec![FormattingInconsistency {
            category: FormattingCategory::BulletStyle,
            patterns: vec![usage("dash", &["a", "c"]), usage("bullet", &["b"])],
        }];
        findings
    }

    fn scores(total_issues: usize) -> Scores {
        Scores {
            cross_document_score: 80.0,
            overall_score: 80.0,
            total_issues,
        }
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(ConsistencyRating::from_issue_count(0), ConsistencyRating::Excellent);
        assert_eq!(ConsistencyRating::from_issue_count(4), ConsistencyRating::Good);
        assert_eq!(ConsistencyRating::from_issue_count(5), ConsistencyRating::Fair);
        assert_eq!(ConsistencyRating::from_issue_count(9), ConsistencyRating::Fair);
        assert_eq!(ConsistencyRating::from_issue_count(10), ConsistencyRating::Poor);
    }

    #[test]
    fn test_issue_views_and_severities() {
        let report = assemble(sample_findings(), scores(3), Vec::new());

        assert_eq!(report.terminology_issues.len(), 2);
        assert_eq!(report.terminology_issues[0].severity, Severity::Critical);
        assert_eq!(
            report.terminology_issues[0].variations_found,
            vec!["attorney", "lawyer", "legal counsel"]
        );
        assert_eq!(report.terminology_issues[1].severity, Severity::Warning);
        assert_eq!(report.terminology_issues[1].affected_documents, vec!["a", "c"]);

        assert_eq!(report.formatting_issues[0].patterns_found, vec!["dash", "bullet"]);
        assert_eq!(report.formatting_issues[0].affected_documents, vec!["a", "c", "b"]);
        assert_eq!(report.formatting_issues[0].severity, Severity::Info);

        assert_eq!(
            report.issues_by_severity,
            SeverityCounts {
                critical: 1,
                warning: 1,
                info: 1
            }
        );
        assert_eq!(report.rating, ConsistencyRating::Good);
    }

    #[test]
    fn test_findings_embedded_verbatim() {
        let findings = sample_findings();
        let report = assemble(findings.clone(), scores(3), Vec::new());
        assert_eq!(report.findings, findings);
        assert_eq!(report.scores.total_issues, 3);
    }

    #[test]
    fn test_timestamp_and_summary() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let mut findings = sample_findings();
        findings.skipped_documents = vec!["blank.txt".to_string()];
        let report = assemble_at(findings, scores(3), Vec::new(), at);

        assert_eq!(report.generated_at, "2024-01-05T12:00:00+00:00");
        assert_eq!(
            report.summary,
            "Compared 3 documents (9 chunks): 2 terminology and 1 formatting inconsistencies, \
             cross-document score 80.0/100 (good). Skipped 1 empty document(s)."
        );
    }

    #[test]
    fn test_serializes_with_snake_case_fields() {
        let report = assemble(ComparisonFindings::empty(2, 2), scores(0), Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rating"], "excellent");
        assert!(json["issues_by_severity"]["critical"].is_number());
        assert!(json["findings"]["term_variation_groups"].is_array());
    }
}
