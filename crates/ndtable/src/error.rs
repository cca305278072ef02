//! Error types for ndtable operations.

use thiserror::Error;

/// The error type for ndtable operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening, reading or decoding the JSONL source failed.
    #[error(transparent)]
    Jsonl(#[from] ndtable_jsonl::Error),

    /// Another cursor of the same source already failed, so the shared
    /// stream cannot be read further.
    #[error("record source failed during an earlier read")]
    SourceFailed,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if the source file could not be opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Jsonl(ndtable_jsonl::Error::Open { .. }))
    }

    /// Returns `true` if a line could not be decoded as a record.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Jsonl(err) if err.is_parse())
    }

    /// Returns `true` if the underlying stream failed after it was opened.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Jsonl(err) if err.is_stream())
    }

    /// Returns `true` if the scan ended because a sibling cursor failed.
    #[must_use]
    pub fn is_source_failed(&self) -> bool {
        matches!(self, Self::SourceFailed)
    }

    /// Returns the line number this error refers to, if any.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Jsonl(err) => err.line_number(),
            Self::SourceFailed | Self::Config(_) => None,
        }
    }
}

/// A specialized Result type for ndtable operations.
pub type Result<T> = std::result::Result<T, Error>;
