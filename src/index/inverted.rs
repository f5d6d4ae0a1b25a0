//! Word -> postings inverted index with contiguous phrase search.

use crate::index::postings::{PostingList, Position, SearchHits};
use crate::index::striped::StripedMap;
use crate::utils::tokenize;

/// In-memory inverted index. Mutated only while a build is running; read-only
/// (and freely shared across sessions) once the build completes.
pub struct InvertedIndex {
    words: StripedMap<String, PostingList>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self {
            words: StripedMap::new(),
        }
    }

    /// Record one occurrence of an already-normalized word.
    pub fn add_occurrence(&self, word: &str, file: &str, position: Position) {
        let postings = self
            .words
            .get_or_insert_with(word.to_string(), PostingList::new);
        postings.push(file, position);
    }

    /// Number of distinct words indexed.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Find every file containing `phrase` as contiguous words, with the
    /// phrase-start positions per file.
    ///
    /// The phrase is tokenized the same way the builder tokenizes corpus
    /// files. The match is computed as a right-to-left fold: the accumulator
    /// always holds the validated start positions of the suffix phrase, and
    /// each step keeps a position p of the next word to the left only when
    /// the accumulator holds p + 1 in the same file.
    pub fn search(&self, phrase: &str) -> SearchHits {
        let words = tokenize(phrase);
        let Some(last) = words.last() else {
            return SearchHits::default();
        };

        let mut result = self.word_hits(last);
        for word in words[..words.len() - 1].iter().rev() {
            if result.is_empty() {
                break;
            }
            result = merge_adjacent(&self.word_hits(word), &result);
        }
        result
    }

    /// Discard all index content. Only used to throw away the partial state
    /// of a failed build.
    pub fn clear(&self) {
        self.words.clear();
    }

    fn word_hits(&self, word: &str) -> SearchHits {
        self.words
            .get(word)
            .map(|postings| postings.snapshot())
            .unwrap_or_default()
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the files present on both sides; within such a file, emit every left
/// position that sits exactly one token before a right position. Both input
/// lists are ascending, so a single forward two-pointer sweep suffices.
fn merge_adjacent(left: &SearchHits, right: &SearchHits) -> SearchHits {
    let mut merged = SearchHits::default();
    for (file, left_positions) in left.iter() {
        let Some(right_positions) = right.positions(file) else {
            continue;
        };

        let mut starts = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < left_positions.len() && j < right_positions.len() {
            let p1 = left_positions[i];
            let p2 = right_positions[j];
            if p1 + 1 == p2 {
                starts.push(p1);
                i += 1;
                j += 1;
            } else if p1 + 1 > p2 {
                j += 1;
            } else {
                i += 1;
            }
        }

        if !starts.is_empty() {
            merged.insert(file.clone(), starts);
        }
    }
    merged
}
