//! Parallel index population.

use crate::index::InvertedIndex;
use crate::utils::{tokenize, CorpusFile};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

/// Populate `index` from `files` using exactly `workers` parallel workers.
///
/// The file list is split into `workers` contiguous, nearly equal slices;
/// the last slice absorbs the remainder, so every file is indexed exactly
/// once. Corpus partitioning is by whole file, which keeps each file's
/// position list single-writer.
///
/// All workers are joined before any error is propagated. On failure the
/// index may hold partial content; discarding it (via `clear`) is the
/// caller's responsibility.
///
/// Returns the wall-clock build duration.
pub fn build_index(
    index: &InvertedIndex,
    files: &[CorpusFile],
    workers: usize,
) -> Result<Duration> {
    let workers = workers.max(1);
    let batch = files.len() / workers;

    let start = Instant::now();
    let mut first_error = None;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let lo = batch * i;
            let hi = if i == workers - 1 {
                files.len()
            } else {
                batch * (i + 1)
            };
            let slice = &files[lo..hi];
            handles.push(scope.spawn(move || index_files(index, slice)));
        }

        // Fan-in: every worker finishes before the build resolves.
        for handle in handles {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(anyhow!("indexing worker panicked")));
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }
    });

    match first_error {
        Some(e) => Err(e),
        None => Ok(start.elapsed()),
    }
}

/// Sequentially index one worker's slice of the corpus.
fn index_files(index: &InvertedIndex, files: &[CorpusFile]) -> Result<()> {
    for file in files {
        let text = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        for (position, word) in tokenize(&text).iter().enumerate() {
            index.add_occurrence(word, &file.id, position as u32);
        }
    }
    Ok(())
}
