//! Wire codec for the newline-terminated chat protocol.
//!
//! Outbound messages end with a blank line (two consecutive newlines);
//! literal newlines inside message text are escaped as the two characters
//! `\n` so the terminator stays unambiguous. Pure functions plus one
//! buffered-read helper; no sockets here.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Marks the end of one outbound message.
pub const MESSAGE_TERMINATOR: &str = "\n\n";

/// Replace every literal newline with the two-character `\n` escape.
pub fn escape(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Reverse of [`escape`].
pub fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Encode one outbound message: escape, terminate, UTF-8 bytes.
pub fn encode(text: &str) -> Vec<u8> {
    let mut line = escape(text);
    line.push_str(MESSAGE_TERMINATOR);
    line.into_bytes()
}

/// Read one line off `reader` with the trailing newline trimmed.
///
/// `None` means the peer is gone (zero-byte read), which callers must
/// treat as "connection lost", never as an empty message.
pub async fn read_line<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = String::new();
    let n = reader.read_line(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(Some(buf))
}
