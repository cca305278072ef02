//! ndtable - query a JSONL file as a read-only table.
//!
//! A [`FileStorage`] opens a line-delimited JSON file; [`RecordSource::query`]
//! turns an exact-match [`Query`] into a [`Cursor`] that yields matching
//! records one at a time, reading the file lazily as it is pulled.
//!
//! This crate provides both the library and the `ndtable` CLI.

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod cursor;
pub mod error;
pub mod source;

pub use config::ScanConfig;
pub use cursor::{Cursor, CursorState, FileLineCursor};
pub use error::{Error, Result};
pub use ndtable_jsonl::{Query, Record};
pub use source::{FileStorage, RecordSource};

use futures::stream::{Stream, StreamExt};
use ndtable_jsonl::JsonlReader;
use std::path::Path;

/// Scan a file with a private stream of its own.
///
/// Unlike cursors from a shared [`FileStorage`], each call opens the file
/// independently, so concurrent scans never compete for lines. The file is
/// closed when the returned stream is dropped.
///
/// # Errors
///
/// Returns a configuration error if `config` is invalid, or an open error
/// if the file cannot be opened.
pub async fn scan(
    path: impl AsRef<Path>,
    query: Query,
    config: &ScanConfig,
) -> Result<impl Stream<Item = Result<Record>>> {
    config.validate()?;
    let mut reader = JsonlReader::open_with_capacity(path, config.buffer_capacity).await?;
    reader.set_read_timeout(config.read_timeout());
    Ok(reader.select(query).map(|item| item.map_err(Error::from)))
}
