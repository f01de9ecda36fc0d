//! Sequential line loading shared by every metadata reader.
//!
//! A file is read front-to-back one line at a time. Each line is decoded
//! with the record's [`LineRecord`] grammar; lines that do not decode are
//! logged and collected in [`Loaded::skipped`], and reading continues. The
//! cancellation token is checked before every line, so a load stops at a
//! line boundary and never partway through decoding one.

use std::path::Path;

use serde::Serialize;
use symstore_types::LineRecord;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::{ReaderError, Result};

/// A line that was dropped because it did not match its record grammar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number within the file.
    pub line_number: usize,
    /// The line as read, without its terminator.
    pub raw: String,
    pub reason: String,
}

/// The result of a load together with the lines it had to drop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Loaded<T> {
    pub value: T,
    pub skipped: Vec<SkippedLine>,
}

impl<T> Loaded<T> {
    pub fn new(value: T, skipped: Vec<SkippedLine>) -> Self {
        Self { value, skipped }
    }

    /// Transform the value, keeping the skip report.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            skipped: self.skipped,
        }
    }

    /// `true` if every line decoded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Load every decodable `R` from the file at `path`, in file order.
///
/// A missing file is [`ReaderError::NotFound`] and yields no partial result.
/// Bytes that are not valid UTF-8 are replaced rather than failing the load.
pub async fn load_lines<R: LineRecord>(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Loaded<Vec<R>>> {
    let file = File::open(path)
        .await
        .map_err(|e| ReaderError::io(path, e))?;
    decode_lines(BufReader::new(file), path, cancel).await
}

/// Decode `R`s from `reader`, which yields the contents of `path`.
async fn decode_lines<R, B>(
    reader: B,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Loaded<Vec<R>>>
where
    R: LineRecord,
    B: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut line_number = 0usize;

    loop {
        if cancel.is_cancelled() {
            debug!(path = %path.display(), line_number, "load cancelled");
            return Err(ReaderError::Cancelled);
        }

        let Some(mut bytes) = segments
            .next_segment()
            .await
            .map_err(|e| ReaderError::io(path, e))?
        else {
            break;
        };
        line_number += 1;

        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        let line = String::from_utf8_lossy(&bytes);

        match R::parse_line(&line) {
            Ok(record) => records.push(record),
            Err(err) => {
                error!(path = %path.display(), line_number, error = %err, "skipping line");
                skipped.push(SkippedLine {
                    line_number,
                    raw: line.into_owned(),
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        path = %path.display(),
        records = records.len(),
        skipped = skipped.len(),
        "file loaded"
    );
    Ok(Loaded::new(records, skipped))
}
