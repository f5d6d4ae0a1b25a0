//! Corpus enumeration.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// One corpus file: its id (path relative to the corpus root, stable for the
/// lifetime of a build) and the path to read it from.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    pub id: String,
    pub path: PathBuf,
}

/// Recursively enumerate every file under `root`, sorted by id so a given
/// corpus always partitions identically across builder workers.
pub fn list_files(root: &Path) -> Result<Vec<CorpusFile>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("invalid corpus root {}", root.display()))?;

    // The corpus is raw data, not a codebase: walk everything, including
    // hidden files and anything a .gitignore would exclude.
    let walker = WalkBuilder::new(&root).standard_filters(false).build();

    let mut files: Vec<CorpusFile> = walker
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let path = entry.path().to_path_buf();
            let id = path.strip_prefix(&root).ok()?.to_string_lossy().into_owned();
            Some(CorpusFile { id, path })
        })
        .collect();

    files.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(files)
}
