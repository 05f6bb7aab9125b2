//! Newline-delimited JSON framing over tokio byte streams

use crate::Message;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Split};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The line arrived whole but is not a valid message record, including
    /// lines that are not UTF-8.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode_message(message: &Message) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_message(line: &str) -> Result<Message, ProtocolError> {
    Ok(serde_json::from_str(line.trim())?)
}

pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let line = encode_message(message)?;
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one message per line from a buffered stream.
///
/// `next_message` is cancel-safe, so it can sit in a `tokio::select!` next to
/// an outbound queue without losing partially read lines.
pub struct MessageReader<R> {
    lines: Split<R>,
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
        }
    }

    /// Returns `Ok(None)` once the peer closes the stream. Blank lines are
    /// skipped; a line that fails to decode yields `ProtocolError::Malformed`
    /// and leaves the reader usable for the next line.
    pub async fn next_message(&mut self) -> Result<Option<Message>, ProtocolError> {
        loop {
            let Some(line) = self.lines.next_segment().await? else {
                return Ok(None);
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            // Bytes go straight to serde_json so invalid UTF-8 is a decode
            // error rather than a read error
            return Ok(Some(serde_json::from_slice(&line)?));
        }
    }
}
