//! Per-word posting storage and query-result types.

use crate::index::striped::StripedMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Zero-based token index within one file.
pub type Position = u32;

/// Concurrent file -> positions store for a single word.
///
/// Cheap to clone: the index hands out shared handles so builder workers can
/// append through them. Positions for one file are only ever appended by one
/// worker (the corpus is partitioned by whole file), so each list stays in
/// ascending order without sorting.
#[derive(Clone, Default)]
pub struct PostingList {
    files: Arc<StripedMap<String, Vec<Position>>>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position to a file's list, creating the list on first use.
    pub fn push(&self, file: &str, position: Position) {
        self.files
            .upsert(file.to_string(), Vec::new, |positions| {
                positions.push(position)
            });
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Immutable snapshot of this word's postings.
    pub fn snapshot(&self) -> SearchHits {
        let mut hits = SearchHits::default();
        for (file, positions) in self.files.entries() {
            if !positions.is_empty() {
                hits.files.insert(file, positions);
            }
        }
        hits
    }
}

/// Result of a word or phrase lookup: file -> ascending phrase-start
/// positions. Files are kept in sorted order so rendered output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    files: BTreeMap<String, Vec<Position>>,
}

impl SearchHits {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn insert(&mut self, file: String, positions: Vec<Position>) {
        self.files.insert(file, positions);
    }

    pub fn positions(&self, file: &str) -> Option<&[Position]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Position>)> {
        self.files.iter()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl fmt::Display for SearchHits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.files.is_empty() {
            return write!(f, "not found");
        }
        write!(f, "Found:")?;
        for (file, positions) in &self.files {
            let rendered: Vec<String> = positions.iter().map(u32::to_string).collect();
            write!(f, "\n\t* {{{}}} positions: [{}];", file, rendered.join(", "))?;
        }
        Ok(())
    }
}
