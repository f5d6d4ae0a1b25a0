//! Line-oriented client REPL.
//!
//! The server speaks first: every turn prints the server's message, then
//! forwards one line of user input. The loop ends when the server confirms
//! the disconnect.

use crate::server::protocol::{read_message, write_message};
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Connect to a running server and run the interactive loop until the
/// server confirms the disconnect or stdin closes.
pub fn run(host: &str, port: u16) -> Result<()> {
    let stream = TcpStream::connect((host, port))
        .with_context(|| format!("failed to connect to {host}:{port}"))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    let stdin = std::io::stdin();
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    loop {
        let response = read_message(&mut reader)?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(&mut stdout, "[SERVER]: ")?;
        stdout.reset()?;
        writeln!(&mut stdout, "{response}")?;

        if response.contains("Disconnected") {
            break;
        }

        write!(&mut stdout, "Enter >>> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        write_message(&mut writer, line.trim_end_matches(['\r', '\n']))?;
    }

    Ok(())
}
