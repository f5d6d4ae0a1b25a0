//! # findex - concurrent in-memory phrase search
//!
//! findex builds an in-memory inverted index over a directory of text files
//! and answers word and phrase lookups from many concurrent clients over a
//! TCP socket.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - lock-striped map, inverted index, parallel index building
//! - [`server`] - TCP server, session protocol, indexing coordination, client
//! - [`utils`] - tokenization and corpus enumeration
//!
//! ## Quick Start
//!
//! ```no_run
//! use findex::index::{build_index, InvertedIndex};
//! use findex::utils::list_files;
//! use std::path::Path;
//!
//! let index = InvertedIndex::new();
//! let files = list_files(Path::new("/path/to/corpus")).unwrap();
//! build_index(&index, &files, 4).unwrap();
//!
//! let hits = index.search("the cat");
//! println!("{hits}");
//! ```
//!
//! ## Concurrency
//!
//! There is no global lock. Index mutation contends only on the striped
//! map's per-bucket locks; a single atomic compare-and-set decides which
//! client session drives the one-and-only index build, and once the build
//! is published the index is immutable and queries run fully in parallel.

pub mod index;
pub mod server;
pub mod utils;
