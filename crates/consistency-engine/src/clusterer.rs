//! Variation clustering
//!
//! Groups term occurrences by exact canonical key. No fuzzy matching happens
//! here: every equivalence decision is made by the normalizer, which keeps
//! this step auditable.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::extractors::TermOccurrence;
use crate::normalizer::fold_inflection;

/// Which variation counts as an inconsistency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationScope {
    /// At least two documents render the concept with different sets of forms
    CrossDocument,
    /// Any two distinct forms, even inside one document
    SingleDocument,
}

/// Surface forms one document uses for a concept, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVariations {
    pub source_document_id: String,
    pub surface_forms: Vec<String>,
}

impl DocumentVariations {
    fn folded_forms(&self) -> BTreeSet<String> {
        self.surface_forms.iter().map(|f| fold(f)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermVariationGroup {
    pub canonical_key: String,
    pub variations_by_document: Vec<DocumentVariations>,
}

impl TermVariationGroup {
    /// Distinct surface forms across all documents, first-seen casing kept
    pub fn distinct_surface_forms(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.variations_by_document
            .iter()
            .flat_map(|d| d.surface_forms.iter())
            .filter(|form| seen.insert(fold(form)))
            .map(|form| form.as_str())
            .collect()
    }

    pub fn document_ids(&self) -> Vec<&str> {
        self.variations_by_document
            .iter()
            .map(|d| d.source_document_id.as_str())
            .collect()
    }

    pub fn is_inconsistent(&self, scope: VariationScope) -> bool {
        if self.distinct_surface_forms().len() < 2 {
            return false;
        }
        match scope {
            VariationScope::SingleDocument => true,
            VariationScope::CrossDocument => {
                let per_document: Vec<BTreeSet<String>> = self
                    .variations_by_document
                    .iter()
                    .map(DocumentVariations::folded_forms)
                    .collect();
                per_document.windows(2).any(|pair| pair[0] != pair[1])
            }
        }
    }
}

/// Surface forms differing only in case or plural inflection are the same form
fn fold(form: &str) -> String {
    fold_inflection(form)
}

/// Group every occurrence by canonical key, in first-seen order
pub fn group_all(occurrences: &[TermOccurrence]) -> Vec<TermVariationGroup> {
    let mut groups: Vec<TermVariationGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for occurrence in occurrences {
        let slot = *index
            .entry(occurrence.canonical_key.as_str())
            .or_insert_with(|| {
                groups.push(TermVariationGroup {
                    canonical_key: occurrence.canonical_key.clone(),
                    variations_by_document: Vec::new(),
                });
                groups.len() - 1
            });
        let group = &mut groups[slot];

        let existing = group
            .variations_by_document
            .iter()
            .position(|d| d.source_document_id == occurrence.source_document_id);
        let position = match existing {
            Some(i) => i,
            None => {
                group.variations_by_document.push(DocumentVariations {
                    source_document_id: occurrence.source_document_id.clone(),
                    surface_forms: Vec::new(),
                });
                group.variations_by_document.len() - 1
            }
        };
        let document = &mut group.variations_by_document[position];

        let folded = fold(&occurrence.surface_form);
        if !document.surface_forms.iter().any(|f| fold(f) == folded) {
            document.surface_forms.push(occurrence.surface_form.clone());
        }
    }

    groups
}

/// Groups that show an inconsistency under `scope`, in first-seen order
pub fn cluster(occurrences: &[TermOccurrence], scope: VariationScope) -> Vec<TermVariationGroup> {
    group_all(occurrences)
        .into_iter()
        .filter(|group| group.is_inconsistent(scope))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn occ(surface: &str, key: &str, doc: &str) -> TermOccurrence {
        TermOccurrence {
            surface_form: surface.to_string(),
            canonical_key: key.to_string(),
            source_document_id: doc.to_string(),
            chunk_id: format!("{}#0", doc),
        }
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let groups = group_all(&[
            occ("Client", "party_role", "a"),
            occ("attorney", "counsel_role", "a"),
            occ("lawyer", "counsel_role", "b"),
        ]);
        let keys: Vec<_> = groups.iter().map(|g| g.canonical_key.as_str()).collect();
        assert_eq!(keys, vec!["party_role", "counsel_role"]);
        assert_eq!(groups[1].document_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_case_only_difference_is_same_form() {
        let groups = group_all(&[
            occ("Client", "party_role", "a"),
            occ("client", "party_role", "b"),
        ]);
        assert_eq!(groups[0].distinct_surface_forms(), vec!["Client"]);
        assert!(!groups[0].is_inconsistent(VariationScope::CrossDocument));
    }

    #[test]
    fn test_plural_only_difference_is_same_form() {
        let occurrences = [
            occ("attorney", "counsel_role", "a"),
            occ("Attorneys", "counsel_role", "b"),
            occ("party", "party_role", "a"),
            occ("parties", "party_role", "b"),
        ];
        assert!(cluster(&occurrences, VariationScope::CrossDocument).is_empty());
        assert!(cluster(&occurrences, VariationScope::SingleDocument).is_empty());
        assert_eq!(group_all(&occurrences)[0].distinct_surface_forms(), vec!["attorney"]);
    }

    #[test]
    fn test_cross_document_divergence_is_flagged() {
        let groups = cluster(
            &[
                occ("attorney", "counsel_role", "a"),
                occ("lawyer", "counsel_role", "b"),
                occ("legal counsel", "counsel_role", "c"),
            ],
            VariationScope::CrossDocument,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].distinct_surface_forms(),
            vec!["attorney", "lawyer", "legal counsel"]
        );
    }

    #[test]
    fn test_variation_inside_one_document_is_not_cross_document() {
        let occurrences = [
            occ("attorney", "counsel_role", "a"),
            occ("lawyer", "counsel_role", "a"),
        ];
        assert!(cluster(&occurrences, VariationScope::CrossDocument).is_empty());
        assert_eq!(cluster(&occurrences, VariationScope::SingleDocument).len(), 1);
    }

    #[test]
    fn test_identical_mixed_usage_is_not_cross_document() {
        let occurrences = [
            occ("attorney", "counsel_role", "a"),
            occ("lawyer", "counsel_role", "a"),
            occ("attorney", "counsel_role", "b"),
            occ("lawyer", "counsel_role", "b"),
        ];
        assert!(cluster(&occurrences, VariationScope::CrossDocument).is_empty());
    }

    #[test]
    fn test_single_form_never_reported() {
        let occurrences = [
            occ("notice", "notice_instrument", "a"),
            occ("notice", "notice_instrument", "b"),
        ];
        assert!(cluster(&occurrences, VariationScope::CrossDocument).is_empty());
        assert!(cluster(&occurrences, VariationScope::SingleDocument).is_empty());
    }

    #[test]
    fn test_repeated_form_recorded_once_per_document() {
        let groups = group_all(&[
            occ("attorney", "counsel_role", "a"),
            occ("Attorney", "counsel_role", "a"),
            occ("attorney", "counsel_role", "a"),
        ]);
        assert_eq!(groups[0].variations_by_document[0].surface_forms, vec!["attorney"]);
    }
}
