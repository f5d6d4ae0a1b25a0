//! In-memory inverted index and its concurrent building blocks.
//!
//! - [`striped`] - lock-striped hash map, the storage primitive
//! - [`postings`] - per-word posting lists and query-result types
//! - [`inverted`] - the word index and contiguous phrase search
//! - [`build`] - parallel corpus indexing

pub mod build;
pub mod inverted;
pub mod postings;
pub mod striped;

pub use build::build_index;
pub use inverted::InvertedIndex;
pub use postings::{PostingList, Position, SearchHits};
pub use striped::StripedMap;
