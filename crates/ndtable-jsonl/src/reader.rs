//! JSONL reading operations.
//!
//! This module provides async functionality for reading JSONL files line-by-line
//! with efficient buffering and line number tracking for error reporting.

use crate::Record;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Default buffer capacity in bytes, matching tokio's `BufReader` default.
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Async reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps an async reader and provides buffered reading of JSONL
/// formatted data. It tracks line numbers to provide useful context in error
/// messages when parsing fails.
///
/// Lines may end in `\n` or `\r\n`. End of input directly after a line
/// terminator is end of data, not an extra empty line; a blank line in the
/// middle of the input is still a line and fails to parse as a record.
///
/// # Type Parameters
///
/// * `R` - The underlying async reader type. Must implement [`AsyncRead`] and [`Unpin`].
///
/// # Examples
///
/// ```no_run
/// use ndtable_jsonl::reader::JsonlReader;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut reader = JsonlReader::open("data.jsonl").await?;
/// while let Some(record) = reader.read_record().await? {
///     println!("{record:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based counting, 0 before any lines are read) for error reporting.
    line_number: usize,
    /// Deadline applied to each underlying line read.
    read_timeout: Option<Duration>,
}

impl JsonlReader<File> {
    /// Opens the file at `path` for reading.
    ///
    /// The file is opened immediately; nothing is read until the first line
    /// is requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be opened for reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_capacity(path, DEFAULT_CAPACITY).await
    }

    /// Opens the file at `path` with a custom buffer capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be opened for reading.
    pub async fn open_with_capacity(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), capacity, "opened JSONL file");
        Ok(Self::with_capacity(file, capacity))
    }
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    ///
    /// The reader is wrapped in a [`BufReader`] for efficient buffered I/O.
    /// Line numbering uses 1-based indexing: the counter starts at 0 and increments
    /// after each line is read, so the first line read is numbered 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndtable_jsonl::reader::JsonlReader;
    /// use std::io::Cursor;
    ///
    /// let reader = JsonlReader::new(Cursor::new(b"{\"id\":1}\n".to_vec()));
    /// assert_eq!(reader.line_number(), 0);
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            read_timeout: None,
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    ///
    /// This is useful when you know the typical line length of your JSONL data
    /// and want to optimize buffer allocation.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            read_timeout: None,
        }
    }

    /// Returns the current line number.
    ///
    /// Returns 0 before any lines have been read. After reading, returns the
    /// 1-based line number of the last line read (first line = 1, second line = 2, etc.).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Increments the line number counter.
    ///
    /// This should be called after successfully reading a line.
    pub(crate) fn increment_line(&mut self) {
        self.line_number += 1;
    }

    /// Returns the deadline applied to each line read, if any.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Sets a deadline for each line read. `None` waits indefinitely.
    ///
    /// A read that misses the deadline fails with [`Error::Timeout`]. Bytes
    /// of a partially read line are lost, so the reader should not be used
    /// after a timeout.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    /// Reads the next raw line, without its line terminator.
    ///
    /// Returns `Ok(None)` once the input is exhausted. The trailing `\n` and
    /// a `\r` preceding it are stripped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying reader fails, or
    /// [`Error::Timeout`] if a read deadline is set and elapses.
    pub async fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let read = match self.read_timeout {
            Some(timeout) => {
                let pending = self.line_number + 1;
                tokio::time::timeout(timeout, self.reader.read_until(b'\n', &mut line))
                    .await
                    .map_err(|_| Error::Timeout {
                        line: pending,
                        timeout,
                    })??
            }
            None => self.reader.read_until(b'\n', &mut line).await?,
        };

        if read == 0 {
            tracing::debug!(lines = self.line_number, "reached end of JSONL data");
            return Ok(None);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        self.increment_line();
        tracing::trace!(line = self.line_number, bytes = line.len(), "read line");
        Ok(Some(line))
    }

    /// Reads the next line and deserializes it as `T`.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the line is not valid JSON for `T`, plus
    /// the stream errors of [`next_line`](Self::next_line).
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let Some(bytes) = self.next_line().await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| Error::Parse {
                line: self.line_number,
                source,
            })
    }

    /// Reads the next line as a [`Record`].
    ///
    /// Any JSON value is accepted; whether it is an object only matters to
    /// the query that filters it.
    ///
    /// # Errors
    ///
    /// Same as [`read_line`](Self::read_line).
    pub async fn read_record(&mut self) -> Result<Option<Record>> {
        self.read_line::<Record>().await
    }

    /// Returns a reference to the underlying buffered reader.
    #[must_use]
    pub fn get_ref(&self) -> &BufReader<R> {
        &self.reader
    }

    /// Returns a mutable reference to the underlying buffered reader.
    ///
    /// Use with caution: reading directly from the buffer may cause
    /// line number tracking to become inaccurate.
    pub fn get_mut(&mut self) -> &mut BufReader<R> {
        &mut self.reader
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

impl<R: AsyncRead + Unpin + Default> Default for JsonlReader<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}
