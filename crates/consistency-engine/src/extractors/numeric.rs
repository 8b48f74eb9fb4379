// Money and rate literal handling shared by the normalizer and term extractor
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Thousands separator between digit groups ("5,000")
    static ref THOUSANDS_SEPARATOR: Regex = Regex::new(r"(\d),(\d{3})\b").unwrap();

    /// Amount followed by a rate unit ("$300 per hour", "300 dollars/hr", "$50 a month")
    static ref RATE_LITERAL: Regex = Regex::new(
        r"(?:\$\s*)?\b(\d+(?:\.\d+)?)\s*(?:(?:dollars?|usd)\b)?\s*(?:/\s*|\b(?:per|an|a)\s+)(hour|hr|day|week|month|year)s?\b",
    )
    .unwrap();

    /// Amount marked as currency by a symbol or unit word ("$300.00", "300 dollars")
    static ref MONEY_LITERAL: Regex = Regex::new(
        r"\$\s*(\d+(?:\.\d+)?)(?:\s*(?:dollars?|usd)\b)?|\b(\d+(?:\.\d+)?)\s*(?:dollars?|usd)\b",
    )
    .unwrap();

    /// Money or rate literal as written in a document, used to find term occurrences
    pub static ref CURRENCY_OCCURRENCE: Regex = Regex::new(
        r"(?i)\$\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s*(?:dollars?|usd)\b)?(?:\s*(?:/\s*|\b(?:per|an|a)\s+)(?:hour|hr|day|week|month|year)s?\b)?|\b\d+(?:,\d{3})*(?:\.\d+)?\s*(?:dollars?|usd)\b(?:\s*(?:/\s*|\b(?:per|an|a)\s+)(?:hour|hr|day|week|month|year)s?\b)?|\b\d+(?:,\d{3})*(?:\.\d+)?\s*(?:/\s*|\b(?:per|an|a)\s+)(?:hour|hr|day|week|month|year)s?\b",
    )
    .unwrap();
}

/// Digits-only key for an amount.
///
/// Whole amounts drop any zero fraction ("300.00" -> "300"). A non-zero
/// fraction follows an underscore, padded to cents and otherwise kept to its
/// last significant digit ("300.5" -> "300_50", "300.995" -> "300_995").
pub fn amount_key(amount: &str) -> String {
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };

    if fraction.chars().all(|c| c == '0') {
        return whole.to_string();
    }

    let mut digits = fraction.trim_end_matches('0').to_string();
    while digits.len() < 2 {
        digits.push('0');
    }
    format!("{}_{}", whole, digits)
}

/// Canonical unit token for a rate ("hr" -> "hour")
fn rate_unit(unit: &str) -> &str {
    match unit {
        "hr" => "hour",
        other => other,
    }
}

/// Remove every thousands separator. Runs to completion before any amount is
/// read, otherwise "1,250,000" would be split at its second comma.
fn strip_thousands_separators(text: &str) -> String {
    let mut current = text.to_string();
    while THOUSANDS_SEPARATOR.is_match(&current) {
        current = THOUSANDS_SEPARATOR
            .replace_all(&current, "$1$2")
            .into_owned();
    }
    current
}

/// Rewrite money and rate literals in lower-cased text until nothing changes.
///
/// Every pass removes a separator, a currency marker or a rate connector, so
/// the loop always terminates.
pub fn rewrite_money_literals(text: &str) -> String {
    let mut current = text.to_string();

    loop {
        let next = strip_thousands_separators(&current);
        let next = RATE_LITERAL
            .replace_all(&next, |caps: &Captures| {
                format!("{} per_{}", amount_key(&caps[1]), rate_unit(&caps[2]))
            })
            .into_owned();
        let next = MONEY_LITERAL
            .replace_all(&next, |caps: &Captures| {
                let amount = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
                amount_key(amount)
            })
            .into_owned();

        if next == current {
            return current;
        }
        current = next;
    }
}
