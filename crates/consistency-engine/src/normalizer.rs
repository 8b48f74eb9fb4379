//! Term normalization
//!
//! Turns a surface form ("Attorney's", "$300.00 per hour") into the canonical
//! key used as the equality basis for clustering. Normalization is pure and
//! idempotent: re-normalizing a canonical key returns it unchanged.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{EngineError, Result};
use crate::extractors::numeric::rewrite_money_literals;
use crate::patterns::is_reserved_unit_word;

/// Synonym table mapping known term variants to a shared canonical key
#[derive(Debug, Clone)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    synonyms: HashMap<String, String>,
    max_phrase_len: usize,
    term_pattern: Option<Regex>,
}

/// One configured concept and the phrasings that express it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub canonical_key: String,
    pub variants: Vec<String>,
}

impl GlossaryEntry {
    pub fn new(canonical_key: impl Into<String>, variants: &[&str]) -> Self {
        Self {
            canonical_key: canonical_key.into(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Glossary {
    /// Build a glossary, rejecting tables that would break idempotent normalization.
    ///
    /// Entries sharing a canonical key are merged.
    pub fn new(entries: Vec<GlossaryEntry>) -> Result<Self> {
        let mut merged: Vec<GlossaryEntry> = Vec::new();
        for entry in entries {
            validate_canonical_key(&entry.canonical_key)?;
            match merged
                .iter_mut()
                .find(|e| e.canonical_key == entry.canonical_key)
            {
                Some(existing) => {
                    for variant in entry.variants {
                        if !existing.variants.contains(&variant) {
                            existing.variants.push(variant);
                        }
                    }
                }
                None => merged.push(entry),
            }
        }

        let mut synonyms: HashMap<String, String> = HashMap::new();
        let mut max_phrase_len = 0;
        for entry in &merged {
            for variant in &entry.variants {
                let trimmed = variant.trim();
                let starts_on_word = trimmed.chars().next().is_some_and(is_word_char);
                let ends_on_word = trimmed.chars().last().is_some_and(is_word_char);
                if !starts_on_word || !ends_on_word {
                    return Err(EngineError::Configuration(format!(
                        "variant '{}' of '{}' must start and end with a letter or digit",
                        variant, entry.canonical_key
                    )));
                }

                let phrase = normalize_text(trimmed);
                if let Some(previous) = synonyms.get(&phrase) {
                    if previous != &entry.canonical_key {
                        return Err(EngineError::Configuration(format!(
                            "variant '{}' maps to both '{}' and '{}'",
                            variant, previous, entry.canonical_key
                        )));
                    }
                }
                max_phrase_len = max_phrase_len.max(phrase.split(' ').count());
                synonyms.insert(phrase, entry.canonical_key.clone());
            }
        }

        let glossary = Self {
            term_pattern: build_term_pattern(&merged)?,
            entries: merged,
            synonyms,
            max_phrase_len,
        };
        glossary.check_keys_are_fixed_points()?;
        Ok(glossary)
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    /// Case-insensitive matcher for every configured variant, longest first.
    /// `None` when the glossary is empty.
    pub fn term_pattern(&self) -> Option<&Regex> {
        self.term_pattern.as_ref()
    }

    /// Replace known variant phrases in already-normalized text with their keys.
    ///
    /// Scans left to right and prefers the longest phrase at each position.
    pub fn apply(&self, normalized: &str) -> String {
        if normalized.is_empty() {
            return String::new();
        }

        let tokens: Vec<&str> = normalized.split(' ').collect();
        let mut output: Vec<String> = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let longest = self.max_phrase_len.min(tokens.len() - i);
            let mut matched = None;

            for len in (1..=longest).rev() {
                let key = if len == 1 {
                    self.lookup_token(tokens[i])
                } else {
                    self.synonyms.get(&tokens[i..i + len].join(" ")).cloned()
                };
                if let Some(key) = key {
                    matched = Some((key, len));
                    break;
                }
            }

            match matched {
                Some((key, len)) => {
                    output.push(key);
                    i += len;
                }
                None => {
                    output.push(tokens[i].to_string());
                    i += 1;
                }
            }
        }

        output.join(" ")
    }

    /// Look up a single token, folding simple English plurals and possessives
    fn lookup_token(&self, token: &str) -> Option<String> {
        if let Some(key) = self.synonyms.get(token) {
            return Some(key.clone());
        }
        singular_forms(token)
            .into_iter()
            .find_map(|form| self.synonyms.get(&form).cloned())
    }

    /// Every canonical key must normalize to itself
    fn check_keys_are_fixed_points(&self) -> Result<()> {
        for entry in &self.entries {
            let key = &entry.canonical_key;

            if let Some(mapped) = self.lookup_token(key) {
                if &mapped != key {
                    return Err(EngineError::Configuration(format!(
                        "canonical key '{}' is itself a variant of '{}'",
                        key, mapped
                    )));
                }
            }

            let inside_phrase = self
                .synonyms
                .keys()
                .filter(|phrase| phrase.contains(' '))
                .find(|phrase| phrase.split(' ').any(|token| token == key));
            if let Some(phrase) = inside_phrase {
                return Err(EngineError::Configuration(format!(
                    "canonical key '{}' appears inside variant phrase '{}'",
                    key, phrase
                )));
            }
        }
        Ok(())
    }
}

/// Canonical keys are lower-case single tokens that the rewriter never touches
fn validate_canonical_key(key: &str) -> Result<()> {
    let well_formed = key.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if !well_formed {
        return Err(EngineError::Configuration(format!(
            "canonical key '{}' must match [a-z][a-z0-9_]*",
            key
        )));
    }
    if is_reserved_unit_word(key) {
        return Err(EngineError::Configuration(format!(
            "canonical key '{}' is a reserved money/rate word",
            key
        )));
    }
    Ok(())
}

fn build_term_pattern(entries: &[GlossaryEntry]) -> Result<Option<Regex>> {
    let mut variants: Vec<&str> = entries
        .iter()
        .flat_map(|e| e.variants.iter().map(|v| v.trim()))
        .collect();
    if variants.is_empty() {
        return Ok(None);
    }

    variants.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    variants.dedup();

    let alternation = variants
        .iter()
        .map(|v| {
            v.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"(?i)\b(?:{})(?:s|es)?\b", alternation))
        .map(Some)
        .map_err(|e| EngineError::Configuration(format!("glossary pattern: {}", e)))
}

fn singular_forms(token: &str) -> Vec<String> {
    let mut forms = Vec::new();
    if token.chars().count() < 4 {
        return forms;
    }
    if let Some(stem) = token.strip_suffix("ies") {
        forms.push(format!("{}y", stem));
    }
    if let Some(stem) = token.strip_suffix("es") {
        forms.push(stem.to_string());
    }
    if let Some(stem) = token.strip_suffix('s') {
        forms.push(stem.to_string());
    }
    forms
}

/// Single deterministic singular for a plural-looking token
fn singular(token: &str) -> String {
    if token.chars().count() < 4 || !token.chars().all(|c| c.is_alphabetic() || c == '-') {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    if token.ends_with("ss") {
        return token.to_string();
    }
    token.strip_suffix('s').unwrap_or(token).to_string()
}

/// Fold a surface form so that case and plural inflection do not count as
/// variation ("Attorneys" and "attorney" fold alike). Currency and rate
/// spellings are left apart, so "$300.00" and "$300" still differ.
pub fn fold_inflection(surface_form: &str) -> String {
    surface_form
        .to_lowercase()
        .split_whitespace()
        .map(singular)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Delete apostrophes, keep hyphens joining two word characters, and turn
/// every other non-word character into a space
fn strip_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if is_word_char(c) {
            out.push(c);
        } else if c == '\'' || c == '\u{2019}' {
            continue;
        } else if c == '-'
            && i > 0
            && is_word_char(chars[i - 1])
            && chars.get(i + 1).copied().is_some_and(is_word_char)
        {
            out.push('-');
        } else {
            out.push(' ');
        }
    }

    out
}

/// Normalize text without applying any synonyms
pub fn normalize_text(surface_form: &str) -> String {
    let lower = surface_form.to_lowercase();
    let rewritten = rewrite_money_literals(&lower);
    let stripped = strip_punctuation(&rewritten);
    let rewritten = rewrite_money_literals(&stripped);
    rewritten.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical key for a surface form
pub fn normalize(surface_form: &str, glossary: &Glossary) -> String {
    glossary.apply(&normalize_text(surface_form))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glossary() -> Glossary {
        Glossary::new(vec![
            GlossaryEntry::new(
                "counsel_role",
                &["attorney", "lawyer", "legal counsel", "attorney-at-law"],
            ),
            GlossaryEntry::new("party_role", &["client", "party", "parties"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_synonyms_share_a_key() {
        let g = glossary();
        assert_eq!(normalize("attorney", &g), "counsel_role");
        assert_eq!(normalize("Lawyer", &g), "counsel_role");
        assert_eq!(normalize("legal  counsel", &g), "counsel_role");
        assert_eq!(normalize("Attorney-at-Law", &g), "counsel_role");
        assert_eq!(normalize("Client", &g), "party_role");
        assert_eq!(normalize("Party", &g), "party_role");
    }

    #[test]
    fn test_plurals_and_possessives_fold() {
        let g = glossary();
        assert_eq!(normalize("attorneys", &g), "counsel_role");
        assert_eq!(normalize("attorney's", &g), "counsel_role");
        assert_eq!(normalize("lawyer’s", &g), "counsel_role");
        assert_eq!(normalize("parties", &g), "party_role");
    }

    #[test]
    fn test_currency_forms_share_a_key() {
        let g = glossary();
        assert_eq!(normalize("$300", &g), "300");
        assert_eq!(normalize("$300.00", &g), "300");
        assert_eq!(normalize("300 dollars", &g), "300");
        assert_eq!(normalize("$300 per hour", &g), "300 per_hour");
        assert_eq!(normalize("$300/hour", &g), "300 per_hour");
    }

    #[test]
    fn test_unknown_terms_normalize_to_themselves() {
        let g = glossary();
        assert_eq!(normalize("Indemnification!", &g), "indemnification");
        assert_eq!(normalize("  force   majeure ", &g), "force majeure");
    }

    #[test]
    fn test_internal_hyphens_survive() {
        assert_eq!(normalize_text("non-compete"), "non-compete");
        assert_eq!(normalize_text("- item -"), "item");
        assert_eq!(normalize_text("a--b"), "a b");
    }

    #[test]
    fn test_renormalizing_a_key_is_a_no_op() {
        let g = glossary();
        for input in ["attorney", "$300.50/hr", "Both parties", "written notice"] {
            let once = normalize(input, &g);
            assert_eq!(normalize(&once, &g), once, "input: {}", input);
        }
    }

    #[test]
    fn test_fold_inflection() {
        assert_eq!(fold_inflection("Attorneys"), "attorney");
        assert_eq!(fold_inflection("parties"), "party");
        assert_eq!(fold_inflection("Legal  Counsel"), "legal counsel");
        assert_eq!(fold_inflection("fees"), fold_inflection("fee"));
        assert_eq!(fold_inflection("addresses"), "address");
        assert_eq!(fold_inflection("business"), "business");
        assert_ne!(fold_inflection("$300.00 per hour"), fold_inflection("$300 per hour"));
        assert_eq!(fold_inflection("$300 per hours"), "$300 per hour");
    }

    #[test]
    fn test_longest_phrase_wins() {
        let g = Glossary::new(vec![
            GlossaryEntry::new("counsel_role", &["counsel"]),
            GlossaryEntry::new("general_counsel_role", &["general counsel"]),
        ])
        .unwrap();
        assert_eq!(normalize("General Counsel", &g), "general_counsel_role");
        assert_eq!(normalize("counsel", &g), "counsel_role");
    }

    #[test]
    fn test_rejects_conflicting_variant() {
        let err = Glossary::new(vec![
            GlossaryEntry::new("counsel_role", &["attorney"]),
            GlossaryEntry::new("party_role", &["attorney"]),
        ])
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_rejects_malformed_keys() {
        for key in ["Counsel", "counsel role", "", "per", "9lives"] {
            let result = Glossary::new(vec![GlossaryEntry::new(key, &["attorney"])]);
            assert!(result.is_err(), "key {:?} should be rejected", key);
        }
    }

    #[test]
    fn test_rejects_key_that_is_another_variant() {
        let result = Glossary::new(vec![
            GlossaryEntry::new("counsel_role", &["attorney"]),
            GlossaryEntry::new("party_role", &["counsel_role"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_variant_with_trailing_punctuation() {
        let result = Glossary::new(vec![GlossaryEntry::new("fee_term", &["fee:"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merges_entries_with_same_key() {
        let g = Glossary::new(vec![
            GlossaryEntry::new("counsel_role", &["attorney"]),
            GlossaryEntry::new("counsel_role", &["solicitor", "attorney"]),
        ])
        .unwrap();
        assert_eq!(g.entries().len(), 1);
        assert_eq!(g.entries()[0].variants, vec!["attorney", "solicitor"]);
    }

    #[test]
    fn test_term_pattern_prefers_longer_variants() {
        let g = glossary();
        let found: Vec<_> = g
            .term_pattern()
            .unwrap()
            .find_iter("The Legal Counsel and the attorneys")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["Legal Counsel", "attorneys"]);
    }
}
