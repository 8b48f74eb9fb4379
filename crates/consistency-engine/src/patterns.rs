//! Built-in glossary and formatting grammar
//!
//! These tables seed [`crate::config::EngineConfig::builtin`]. Deployments extend
//! them through the TOML configuration rather than editing this file.

use crate::formatting::FormattingCategory;

/// Legal-role and instrument terms that firms routinely phrase differently.
///
/// Each entry is `(canonical_key, variants)`. Variants are matched
/// case-insensitively on word boundaries, with an optional plural suffix.
pub const BUILTIN_GLOSSARY: &[(&str, &[&str])] = &[
    (
        "counsel_role",
        &[
            "attorney",
            "attorney-at-law",
            "lawyer",
            "legal counsel",
            "counsel",
            "solicitor",
        ],
    ),
    ("party_role", &["client", "party", "parties"]),
    ("agreement_instrument", &["agreement", "contract"]),
    ("notice_instrument", &["notice", "notification"]),
    (
        "termination_action",
        &["terminate", "termination", "cancel", "cancellation"],
    ),
    (
        "compensation_term",
        &["fee", "fees", "compensation", "payment", "remuneration"],
    ),
    (
        "retainer_term",
        &["retainer", "retainer fee", "initial retainer"],
    ),
    (
        "rate_term",
        &["hourly rate", "rate per hour", "hourly fee"],
    ),
    (
        "attachment_reference",
        &["exhibit", "schedule", "appendix", "annex"],
    ),
    (
        "services_term",
        &["services", "legal services", "representation"],
    ),
];

/// Words the money/rate rewriter consumes. A canonical key may not be one of
/// these, otherwise re-normalizing a key could trigger a second rewrite.
pub const RESERVED_UNIT_WORDS: &[&str] = &[
    "a", "an", "per", "dollar", "dollars", "usd", "hour", "hours", "hr", "hrs", "day", "days",
    "week", "weeks", "month", "months", "year", "years",
];

/// Built-in formatting grammar, in priority order within each category.
///
/// Line-marker categories are matched against each trimmed line; inline
/// categories are searched anywhere in the line.
pub const BUILTIN_GRAMMAR: &[(FormattingCategory, &str, &str)] = &[
    // Section headings (checked before bullets so "1. Scope" is a heading)
    (
        FormattingCategory::SectionNumbering,
        "section_word",
        r"(?i)^\s*section\s+\d+(?:\.\d+)*\b",
    ),
    (
        FormattingCategory::SectionNumbering,
        "sec_abbrev",
        r"(?i)^\s*sec\.\s*\d+",
    ),
    (
        FormattingCategory::SectionNumbering,
        "section_symbol",
        r"^\s*§+\s*\d+",
    ),
    (
        FormattingCategory::SectionNumbering,
        "article_word",
        r"(?i)^\s*article\s+(?:\d+|[ivxlc]+)\b",
    ),
    (
        FormattingCategory::SectionNumbering,
        "decimal_number",
        r"^\s*\d{1,3}(?:\.\d{1,3})+\.?\s+[A-Z][^.!?;:]{0,80}$",
    ),
    (
        FormattingCategory::SectionNumbering,
        "bare_number",
        r"^\s*\d{1,3}\.\s+[A-Z][^.!?;:]{0,60}$",
    ),
    // List markers
    (FormattingCategory::BulletStyle, "dash", r"^\s*-\s+\S"),
    (FormattingCategory::BulletStyle, "bullet", r"^\s*[•◦▪‣]\s*\S"),
    (FormattingCategory::BulletStyle, "asterisk", r"^\s*\*\s+\S"),
    (
        FormattingCategory::BulletStyle,
        "numbered_dot",
        r"^\s*\d{1,3}\.\s+\S",
    ),
    (
        FormattingCategory::BulletStyle,
        "numbered_paren",
        r"^\s*\(?\d{1,3}\)\s+\S",
    ),
    (
        FormattingCategory::BulletStyle,
        "lettered_paren",
        r"^\s*\(?[a-z]\)\s+\S",
    ),
    (
        FormattingCategory::BulletStyle,
        "lettered_dot",
        r"^\s*[a-z]\.\s+\S",
    ),
    // Currency amounts
    (
        FormattingCategory::CurrencyFormat,
        "dollar_cents",
        r"\$\s?\d+(?:,\d{3})*\.\d{2}\b",
    ),
    (
        FormattingCategory::CurrencyFormat,
        "dollar_sign",
        r"\$\s?\d+(?:,\d{3})*",
    ),
    (
        FormattingCategory::CurrencyFormat,
        "word_dollars",
        r"(?i)\b\d+(?:,\d{3})*(?:\.\d+)?\s+dollars?\b",
    ),
    (
        FormattingCategory::CurrencyFormat,
        "iso_code",
        r"(?i)\b(?:\d+(?:,\d{3})*(?:\.\d+)?\s*usd|usd\s*\d+(?:,\d{3})*(?:\.\d+)?)\b",
    ),
    // Rate units
    (
        FormattingCategory::RateNotation,
        "slash_unit",
        r"(?i)\d\s*/\s*(?:hour|hr|day|week|month|year)s?\b",
    ),
    (
        FormattingCategory::RateNotation,
        "per_unit",
        r"(?i)\d(?:\s*dollars?|\s*usd)?\s+per\s+(?:hour|hr|day|week|month|year)s?\b",
    ),
    (
        FormattingCategory::RateNotation,
        "article_unit",
        r"(?i)\d(?:\s*dollars?|\s*usd)?\s+an?\s+(?:hour|hr|day|week|month|year)\b",
    ),
    // Dates
    (
        FormattingCategory::DateFormat,
        "ordinal_day_of",
        r"(?i)\b\d{1,2}(?:st|nd|rd|th)\s+day\s+of\s+(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?,?\s+\d{4}\b",
    ),
    (
        FormattingCategory::DateFormat,
        "month_day_year",
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b",
    ),
    (
        FormattingCategory::DateFormat,
        "day_month_year",
        r"(?i)\b\d{1,2}(?:st|nd|rd|th)?\s+(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?,?\s+\d{4}\b",
    ),
    (
        FormattingCategory::DateFormat,
        "iso_8601",
        r"\b\d{4}-\d{2}-\d{2}\b",
    ),
    (
        FormattingCategory::DateFormat,
        "numeric_slash",
        r"\b\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})\b",
    ),
];

/// Check if a token is a reserved money/rate word
pub fn is_reserved_unit_word(token: &str) -> bool {
    RESERVED_UNIT_WORDS.contains(&token)
}
