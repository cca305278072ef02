//! Error types for ndtable-jsonl operations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The error type for ndtable-jsonl operations.
///
/// Variants fall into three classes: failures to open a source
/// ([`Error::Open`]), failures of the underlying stream after it was opened
/// ([`Error::Io`], [`Error::Timeout`]), and lines that are not valid JSON
/// ([`Error::Parse`]). None of them are
/// retried; every one ends the scan that produced it.
#[derive(Debug, Error)]
pub enum Error {
    /// The source file could not be opened for reading.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// IO error occurred while reading from an open stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Reading a line did not complete within the configured deadline.
    #[error("timed out after {timeout:?} waiting for line {line}")]
    Timeout {
        /// 1-based number of the line being read.
        line: usize,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// A line is not valid JSON.
    #[error("JSON error on line {line}: {source}")]
    Parse {
        /// 1-based line number of the offending line.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid input format, such as a malformed query assignment.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// Returns the line number this error refers to, if any.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Timeout { line, .. } | Self::Parse { line, .. } => Some(*line),
            Self::Open { .. } | Self::Io(_) | Self::InvalidFormat(_) => None,
        }
    }

    /// Returns `true` if a line's content is not valid JSON.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns `true` if the underlying stream failed after it was opened.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout { .. })
    }
}

/// A specialized Result type for ndtable-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
