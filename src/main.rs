use anyhow::Result;
use clap::{Parser, Subcommand};
use findex::server::{client, SearchServer, DEFAULT_PORT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "findex")]
#[command(about = "Concurrent in-memory phrase search served over a socket")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the search server
    Serve {
        /// Directory holding the text corpus to index
        corpus: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Connect to a running server
    Connect {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { corpus, port } => {
            let server = SearchServer::new(corpus);
            server.run(port)
        }
        Commands::Connect { host, port } => client::run(&host, port),
    }
}
