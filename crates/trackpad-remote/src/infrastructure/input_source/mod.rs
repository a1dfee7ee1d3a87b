//! JSON-lines reader feeding the trackpad session.
//!
//! One line is one [`InputLine`].  Blank lines and lines starting with `#` are
//! ignored so recorded sessions can carry comments.  A malformed line is
//! logged and skipped; it never stops the reader.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::InputLine;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("malformed input line: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("input read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses one line.  `Ok(None)` for blank and comment lines.
pub fn parse_input_line(line: &str) -> Result<Option<InputLine>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Reads `reader` to the end, forwarding every parsed line to `tx`.
///
/// Returns the number of lines forwarded.  Stops early, without error, when
/// the receiver is dropped.
///
/// # Errors
///
/// [`InputError::Io`] if reading fails.
pub async fn read_input_lines<R>(reader: R, tx: mpsc::Sender<InputLine>) -> Result<usize, InputError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0usize;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_input_line(&line) {
            Ok(Some(input)) => {
                if tx.send(input).await.is_err() {
                    debug!("input receiver dropped; stopping reader");
                    break;
                }
                forwarded += 1;
            }
            Ok(None) => {}
            Err(e) => warn!(line = line_no, "skipping input: {e}"),
        }
    }
    Ok(forwarded)
}
