//! Formatting pattern detection
//!
//! Scans chunk text line by line and classifies list markers, section
//! headings, currency literals, rate units and dates into a small closed set
//! of pattern keys. Detection is purely syntactic.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared_types::Chunk;

use crate::error::{EngineError, Result};
use crate::patterns::BUILTIN_GRAMMAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingCategory {
    BulletStyle,
    SectionNumbering,
    CurrencyFormat,
    RateNotation,
    DateFormat,
}

impl FormattingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormattingCategory::BulletStyle => "bullet_style",
            FormattingCategory::SectionNumbering => "section_numbering",
            FormattingCategory::CurrencyFormat => "currency_format",
            FormattingCategory::RateNotation => "rate_notation",
            FormattingCategory::DateFormat => "date_format",
        }
    }

    /// Line-marker categories describe how a line starts and yield at most
    /// one signature per line. The rest are searched inline.
    pub fn is_line_marker(&self) -> bool {
        matches!(
            self,
            FormattingCategory::BulletStyle | FormattingCategory::SectionNumbering
        )
    }
}

impl fmt::Display for FormattingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One style observation in one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingSignature {
    pub category: FormattingCategory,
    pub pattern_key: String,
    pub source_document_id: String,
    pub chunk_id: String,
}

/// A compiled grammar rule
#[derive(Debug, Clone)]
pub struct FormattingRule {
    pub category: FormattingCategory,
    pub pattern_key: String,
    pub regex: Regex,
}

impl FormattingRule {
    pub fn new(category: FormattingCategory, pattern_key: &str, pattern: &str) -> Result<Self> {
        if pattern_key.trim().is_empty() {
            return Err(EngineError::Configuration(format!(
                "{} rule has an empty pattern key",
                category
            )));
        }
        let regex = Regex::new(pattern).map_err(|e| {
            EngineError::Configuration(format!(
                "{} rule '{}' has an invalid regex: {}",
                category, pattern_key, e
            ))
        })?;
        Ok(Self {
            category,
            pattern_key: pattern_key.to_string(),
            regex,
        })
    }
}

lazy_static! {
    static ref BUILTIN_RULES: Vec<FormattingRule> = BUILTIN_GRAMMAR
        .iter()
        .map(|(category, key, pattern)| FormattingRule::new(*category, key, pattern).unwrap())
        .collect();
}

/// Ordered rule set; earlier rules win within a category
#[derive(Debug, Clone)]
pub struct FormattingGrammar {
    rules: Vec<FormattingRule>,
}

impl FormattingGrammar {
    pub fn new(rules: Vec<FormattingRule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_RULES.clone())
    }

    /// Built-in rules followed by `extra`, which can only add lower-priority keys
    pub fn builtin_with(extra: Vec<FormattingRule>) -> Self {
        let mut rules = BUILTIN_RULES.clone();
        rules.extend(extra);
        Self::new(rules)
    }

    pub fn rules(&self) -> &[FormattingRule] {
        &self.rules
    }

    fn rules_for(&self, category: FormattingCategory) -> impl Iterator<Item = &FormattingRule> {
        self.rules.iter().filter(move |r| r.category == category)
    }

    /// First line-marker rule of `category` matching the line
    fn classify_line(&self, category: FormattingCategory, line: &str) -> Option<&str> {
        self.rules_for(category)
            .find(|rule| rule.regex.is_match(line))
            .map(|rule| rule.pattern_key.as_str())
    }

    /// Non-overlapping inline matches of `category`, in line order
    fn scan_inline<'a>(&'a self, category: FormattingCategory, line: &str) -> Vec<&'a str> {
        let mut claimed: Vec<(usize, usize, &str)> = Vec::new();

        for rule in self.rules_for(category) {
            for m in rule.regex.find_iter(line) {
                let overlaps = claimed
                    .iter()
                    .any(|(start, end, _)| m.start() < *end && *start < m.end());
                if !overlaps {
                    claimed.push((m.start(), m.end(), rule.pattern_key.as_str()));
                }
            }
        }

        claimed.sort_by_key(|(start, _, _)| *start);
        claimed.into_iter().map(|(_, _, key)| key).collect()
    }
}

const CATEGORIES: [FormattingCategory; 5] = [
    FormattingCategory::SectionNumbering,
    FormattingCategory::BulletStyle,
    FormattingCategory::CurrencyFormat,
    FormattingCategory::RateNotation,
    FormattingCategory::DateFormat,
];

/// A line that reads as both a heading and a list item is a list item when
/// an adjacent line carries the same list marker ("1. First\n2. Second").
fn in_list_run(grammar: &FormattingGrammar, lines: &[&str], index: usize, bullet: &str) -> bool {
    let same_marker = |i: usize| {
        lines
            .get(i)
            .and_then(|line| grammar.classify_line(FormattingCategory::BulletStyle, line))
            == Some(bullet)
    };
    (index > 0 && same_marker(index - 1)) || same_marker(index + 1)
}

/// Detect every formatting signature in a chunk, in line order
pub fn detect(chunk: &Chunk, grammar: &FormattingGrammar) -> Vec<FormattingSignature> {
    let mut signatures = Vec::new();
    let signature = |category, key: &str| FormattingSignature {
        category,
        pattern_key: key.to_string(),
        source_document_id: chunk.source_document_id.clone(),
        chunk_id: chunk.id.clone(),
    };

    let lines: Vec<&str> = chunk.raw_text.lines().map(str::trim_end).collect();
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let bullet = grammar.classify_line(FormattingCategory::BulletStyle, line);
        let heading = grammar
            .classify_line(FormattingCategory::SectionNumbering, line)
            .filter(|_| !bullet.is_some_and(|key| in_list_run(grammar, &lines, index, key)));

        // A heading line is not also a list item
        match (heading, bullet) {
            (Some(key), _) => signatures.push(signature(FormattingCategory::SectionNumbering, key)),
            (None, Some(key)) => signatures.push(signature(FormattingCategory::BulletStyle, key)),
            (None, None) => {}
        }

        for category in CATEGORIES.into_iter().filter(|c| !c.is_line_marker()) {
            for key in grammar.scan_inline(category, line) {
                signatures.push(signature(category, key));
            }
        }
    }

    signatures
}
