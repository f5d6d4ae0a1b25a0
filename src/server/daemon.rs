//! Search server: accept loop and per-connection protocol sessions.
//!
//! One thread per client connection, all sharing the inverted index and the
//! indexing coordinator. The first session to ask for a search while the
//! index is unbuilt wins the coordinator's compare-and-set and drives the
//! build; sessions arriving meanwhile are answered immediately with an
//! in-progress message and never block the accept loop.

use crate::index::{build_index, InvertedIndex};
use crate::server::coordinator::{IndexState, IndexingCoordinator};
use crate::server::protocol::{
    read_message, write_message, DISCONNECT, ENTER_WORD, EXECUTION_TIME, INDEXING_ERROR,
    INDEX_NOT_READY, INDEX_READY, IN_PROCESS, OPTIONS, REQUIRE_INDEXING, WRONG_COMMAND,
    WRONG_INPUT, WRONG_INTEGER, WRONG_STRING,
};
use crate::utils::list_files;
use anyhow::{Context, Result};
use lru::LruCache;
use regex::Regex;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

/// LRU cache size for rendered phrase results.
const CACHE_SIZE: usize = 128;

/// A searched phrase may contain letters and spaces only.
fn phrase_is_valid(phrase: &str) -> bool {
    static PHRASE_RE: OnceLock<Regex> = OnceLock::new();
    PHRASE_RE
        .get_or_init(|| Regex::new("^[a-zA-Z ]+$").unwrap())
        .is_match(phrase)
}

/// The phrase search server.
pub struct SearchServer {
    index: InvertedIndex,
    coordinator: IndexingCoordinator,
    corpus_root: PathBuf,
    /// Rendered phrase -> response text. Only consulted once the index is
    /// ready; the index is immutable from then on, so entries never go stale.
    query_cache: Mutex<LruCache<String, String>>,
}

impl SearchServer {
    /// Create a new server wrapped in Arc.
    pub fn new(corpus_root: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            index: InvertedIndex::new(),
            coordinator: IndexingCoordinator::new(),
            corpus_root,
            query_cache: Mutex::new(LruCache::new(NonZeroUsize::new(CACHE_SIZE).unwrap())),
        })
    }

    /// Bind the listen port and serve forever. A failed bind is fatal: it
    /// propagates to the caller and takes the process down.
    pub fn run(self: &Arc<Self>, port: u16) -> Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .with_context(|| format!("failed to bind port {port}"))?;
        eprintln!("findexd: listening on port {port}");
        self.serve(listener)
    }

    /// Accept connections on an already-bound listener.
    pub fn serve(self: &Arc<Self>, listener: TcpListener) -> Result<()> {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let server = Arc::clone(self);
                    thread::spawn(move || {
                        let peer = stream
                            .peer_addr()
                            .map(|addr| addr.to_string())
                            .unwrap_or_else(|_| "unknown".to_string());
                        eprintln!("findexd: client {peer} connected");
                        if let Err(e) = server.handle_connection(stream, &peer) {
                            eprintln!("findexd: client {peer} session error: {e:#}");
                        }
                        eprintln!("findexd: client {peer} disconnected");
                    });
                }
                Err(e) => {
                    eprintln!("findexd: accept error: {e}");
                }
            }
        }
        Ok(())
    }

    /// Per-connection protocol loop.
    fn handle_connection(&self, stream: TcpStream, peer: &str) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        write_message(&mut writer, OPTIONS)?;
        loop {
            let command = match read_message(&mut reader) {
                Ok(command) => command,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };

            match command.as_str() {
                "1" => self.handle_search(&mut reader, &mut writer, peer)?,
                "2" => write_message(&mut writer, status_line(self.coordinator.state()))?,
                "3" => write_message(&mut writer, OPTIONS)?,
                "4" => {
                    write_message(&mut writer, DISCONNECT)?;
                    break;
                }
                _ => write_message(&mut writer, WRONG_COMMAND)?,
            }
        }
        Ok(())
    }

    /// Command 1: answer a phrase query when the index is ready, otherwise
    /// either drive the build (compare-and-set winner) or report that a
    /// build is already running.
    fn handle_search<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        writer: &mut W,
        peer: &str,
    ) -> Result<()> {
        if self.coordinator.state() == IndexState::Ready {
            return self.answer_query(reader, writer, peer);
        }

        if !self.coordinator.try_begin_build() {
            write_message(writer, IN_PROCESS)?;
            return Ok(());
        }

        let result = self.drive_build(reader, writer, peer);
        if result.is_err() && self.coordinator.state() == IndexState::Building {
            // The driver's connection died mid-dialogue; give the build slot
            // back so another session can still build.
            self.coordinator.abandon_build();
        }
        result
    }

    /// Build-driver path: collect a worker count from the client, run the
    /// build, and publish the outcome.
    fn drive_build<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        writer: &mut W,
        peer: &str,
    ) -> Result<()> {
        write_message(writer, REQUIRE_INDEXING)?;

        let reply = read_message(reader)?;
        let workers = match reply.trim().parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                // Invalid input leaves everything as it was before this
                // request, including the build slot.
                self.coordinator.abandon_build();
                write_message(writer, &format!("{WRONG_INPUT}{WRONG_INTEGER}"))?;
                return Ok(());
            }
        };

        eprintln!("findexd: client {peer} started indexing with {workers} workers");
        match self.run_build(workers) {
            Ok(elapsed) => {
                self.coordinator.mark_ready();
                let line = format!("{EXECUTION_TIME}{:.3} ms", elapsed.as_secs_f64() * 1000.0);
                eprintln!("findexd: {line} ({} words)", self.index.word_count());
                write_message(writer, &line)?;
            }
            Err(e) => {
                eprintln!("findexd: indexing failed: {e:#}");
                self.index.clear();
                self.coordinator.abandon_build();
                write_message(writer, INDEXING_ERROR)?;
            }
        }
        Ok(())
    }

    fn run_build(&self, workers: usize) -> Result<std::time::Duration> {
        let files = list_files(&self.corpus_root)?;
        build_index(&self.index, &files, workers)
    }

    /// Ready-index path of command 1: prompt for a phrase, validate it, and
    /// respond with the rendered result.
    fn answer_query<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        writer: &mut W,
        peer: &str,
    ) -> Result<()> {
        write_message(writer, ENTER_WORD)?;
        let phrase = read_message(reader)?;

        if !phrase_is_valid(&phrase) {
            write_message(writer, &format!("{WRONG_INPUT}{WRONG_STRING}"))?;
            return Ok(());
        }

        if let Some(hit) = self.query_cache.lock().unwrap().get(&phrase).cloned() {
            eprintln!("findexd: client {peer} searched: {phrase} (cached)");
            write_message(writer, &hit)?;
            return Ok(());
        }

        let hits = self.index.search(&phrase);
        eprintln!(
            "findexd: client {peer} searched: {phrase} ({} files)",
            hits.file_count()
        );
        let rendered = hits.to_string();
        self.query_cache
            .lock()
            .unwrap()
            .put(phrase, rendered.clone());
        write_message(writer, &rendered)?;
        Ok(())
    }
}

fn status_line(state: IndexState) -> &'static str {
    match state {
        IndexState::Ready => INDEX_READY,
        IndexState::Building => IN_PROCESS,
        IndexState::NotBuilt => INDEX_NOT_READY,
    }
}
