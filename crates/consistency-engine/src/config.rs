//! Engine configuration
//!
//! [`EngineConfig::builtin`] carries the built-in glossary and grammar.
//! Deployments extend or replace them with a TOML file:
//!
//! ```toml
//! max_example_chunks = 3
//!
//! [scoring]
//! document_baseline = 5.0
//!
//! [glossary]
//! include_builtin = true
//! [[glossary.terms]]
//! canonical_key = "counsel_role"
//! variants = ["solicitor"]
//!
//! [formatting]
//! [[formatting.rules]]
//! category = "bullet_style"
//! pattern_key = "arrow"
//! regex = '^\s*→\s+\S'
//! ```

use std::path::Path;

use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::formatting::{FormattingCategory, FormattingGrammar, FormattingRule};
use crate::normalizer::{Glossary, GlossaryEntry};
use crate::patterns::BUILTIN_GLOSSARY;
use crate::scoring::ScoringConfig;

pub const DEFAULT_MAX_EXAMPLE_CHUNKS: usize = 3;

lazy_static! {
    static ref BUILTIN_GLOSSARY_ENTRIES: Vec<GlossaryEntry> = BUILTIN_GLOSSARY
        .iter()
        .map(|(key, variants)| GlossaryEntry::new(*key, variants))
        .collect();
    static ref BUILTIN: Glossary = Glossary::new(BUILTIN_GLOSSARY_ENTRIES.clone()).unwrap();
}

impl Glossary {
    /// The built-in legal glossary
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }
}

/// Everything a comparison run needs besides the documents
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub glossary: Glossary,
    pub grammar: FormattingGrammar,
    pub scoring: ScoringConfig,
    /// Upper bound on example chunk ids kept per formatting pattern
    pub max_example_chunks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    max_example_chunks: Option<usize>,
    scoring: ScoringConfig,
    glossary: GlossarySection,
    formatting: FormattingSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GlossarySection {
    include_builtin: bool,
    terms: Vec<TermSpec>,
}

impl Default for GlossarySection {
    fn default() -> Self {
        Self {
            include_builtin: true,
            terms: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TermSpec {
    canonical_key: String,
    variants: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FormattingSection {
    include_builtin: bool,
    rules: Vec<RuleSpec>,
}

impl Default for FormattingSection {
    fn default() -> Self {
        Self {
            include_builtin: true,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    category: FormattingCategory,
    pattern_key: String,
    regex: String,
}

impl EngineConfig {
    pub fn builtin() -> Self {
        Self {
            glossary: Glossary::builtin(),
            grammar: FormattingGrammar::builtin(),
            scoring: ScoringConfig::default(),
            max_example_chunks: DEFAULT_MAX_EXAMPLE_CHUNKS,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| EngineError::Configuration(format!("invalid TOML: {}", e)))?;

        let max_example_chunks = file
            .max_example_chunks
            .unwrap_or(DEFAULT_MAX_EXAMPLE_CHUNKS);
        if max_example_chunks == 0 {
            return Err(EngineError::Configuration(
                "max_example_chunks must be at least 1".to_string(),
            ));
        }
        file.scoring.validate()?;

        let mut entries = if file.glossary.include_builtin {
            BUILTIN_GLOSSARY_ENTRIES.clone()
        } else {
            Vec::new()
        };
        entries.extend(file.glossary.terms.into_iter().map(|t| GlossaryEntry {
            canonical_key: t.canonical_key,
            variants: t.variants,
        }));
        let glossary = Glossary::new(entries)?;

        let rules = file
            .formatting
            .rules
            .iter()
            .map(|r| FormattingRule::new(r.category, &r.pattern_key, &r.regex))
            .collect::<Result<Vec<_>>>()?;
        let grammar = if file.formatting.include_builtin {
            FormattingGrammar::builtin_with(rules)
        } else {
            FormattingGrammar::new(rules)
        };

        debug!(
            "Loaded config: {} glossary entries, {} formatting rules",
            glossary.entries().len(),
            grammar.rules().len()
        );

        Ok(Self {
            glossary,
            grammar,
            scoring: file.scoring,
            max_example_chunks,
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}
