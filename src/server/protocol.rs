//! Wire protocol for client-server communication.
//!
//! Each logical message is one UTF-8 string, framed with a length prefix:
//! - 4 bytes (little-endian u32): payload length
//! - N bytes: the string
//!
//! Both requests and responses use the same framing; a request is a single
//! command token ("1".."4") or a free-text reply to a server prompt.

use std::io::{self, Read, Write};

/// Sanity cap on a single message.
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Options banner, sent on connect and on command 3.
pub const OPTIONS: &str = "Specify command:\n\
    1. Find files and positions by word/phrase\n\
    2. Check indexing status\n\
    3. See options\n\
    4. Disconnect";

pub const IN_PROCESS: &str = "Indexing is in process...";
pub const REQUIRE_INDEXING: &str =
    "Index require population. Please specify a number of threads for execution: ";
pub const EXECUTION_TIME: &str = "Indexing execution time: ";
pub const INDEX_READY: &str = "Index is ready!";
pub const INDEX_NOT_READY: &str = "Index hasn't been populated yet";
pub const ENTER_WORD: &str = "Please enter a word/phrase";
pub const DISCONNECT: &str = "Disconnected successfully!";
pub const INDEXING_ERROR: &str = "Error occurred while indexing. Please try again later";
pub const WRONG_COMMAND: &str = "You submitted invalid command. Try again please";
pub const WRONG_INPUT: &str = "You submitted invalid input. Input must contain ";
pub const WRONG_INTEGER: &str = "integer with value >= 0";
pub const WRONG_STRING: &str = "only word characters with whitespaces (if required)";

/// Write one framed message.
pub fn write_message<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    let bytes = text.as_bytes();
    writer.write_all(&(bytes.len() as u32).to_le_bytes())?;
    writer.write_all(bytes)?;
    writer.flush()
}

/// Read one framed message.
pub fn read_message<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "message too large",
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
