pub mod types;

pub use types::{Chunk, DocumentGroup, Severity};
