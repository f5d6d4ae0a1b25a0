//! Shared utilities: word extraction and corpus enumeration.

pub mod tokenizer;
pub mod walker;

pub use tokenizer::*;
pub use walker::*;
