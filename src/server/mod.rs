//! Network layer: accept loop, per-session protocol handling, the indexing
//! coordinator shared by all sessions, and the REPL client.
//!
//! Architecture:
//! - `findexd` server: holds the inverted index, listens on a TCP port, and
//!   runs one session thread per connected client
//! - Client: connects to the port, relays user input, prints responses
//! - Coordination: a single atomic state register decides which session may
//!   build the index; everyone else only reads

pub mod client;
pub mod coordinator;
pub mod daemon;
pub mod protocol;

pub use coordinator::{IndexState, IndexingCoordinator};
pub use daemon::SearchServer;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 10000;
