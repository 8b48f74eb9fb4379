//! Extraction of comparable terms from chunk text

pub mod numeric;
pub mod terms;

pub use terms::{extract_terms, TermOccurrence};
