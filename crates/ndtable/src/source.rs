//! Queryable record sources.
//!
//! A [`RecordSource`] hands out [`Cursor`]s for queries. Creating a cursor
//! reads nothing; all reading happens as the cursor is pulled.
//!
//! [`FileStorage`] is the file-backed source. It opens its file once, at
//! construction, and never reopens or seeks it. Every cursor it creates
//! shares that one stream, so cursors from the same source compete for
//! lines. Scans that must each see the whole file need a source apiece.
//!
//! # Example
//!
//! ```no_run
//! use ndtable::{Cursor, FileStorage, Query, RecordSource};
//!
//! # async fn example() -> ndtable::Result<()> {
//! let storage = FileStorage::open("storage.dat").await?;
//! let mut cursor = storage.query(Query::new().with("city", "Roma"));
//! while let Some(record) = cursor.next().await? {
//!     println!("{record:?}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::ScanConfig;
use crate::cursor::{Cursor, FileLineCursor};
use crate::error::Result;
use ndtable_jsonl::{JsonlReader, Query};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::sync::Mutex;

/// The stream shared by a source and its cursors.
///
/// Once the file handle is released the variant records why, so a cursor
/// arriving later can tell a drained file from a failed one.
#[derive(Debug)]
pub(crate) enum SharedStream {
    /// The file is open and positioned at the next unread line.
    Open(JsonlReader<File>),
    /// A cursor read to end of data.
    Drained,
    /// A cursor hit a read or parse error.
    Failed,
    /// [`FileStorage::close`] released the handle.
    Closed,
}

impl SharedStream {
    fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

pub(crate) type SharedReader = Arc<Mutex<SharedStream>>;

/// A collection of records that can be queried.
pub trait RecordSource {
    /// The cursor type produced by [`query`](Self::query).
    type Cursor: Cursor;

    /// Create a cursor over the records matching `query`.
    ///
    /// No data is read until the cursor is pulled.
    fn query(&self, query: Query) -> Self::Cursor;
}

/// A record source backed by a line-delimited JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    reader: SharedReader,
}

impl FileStorage {
    /// Open the file at `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an open error if the file cannot be opened for reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &ScanConfig::default()).await
    }

    /// Open the file at `path` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid, or an open
    /// error if the file cannot be opened for reading.
    pub async fn open_with(path: impl AsRef<Path>, config: &ScanConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let mut reader = JsonlReader::open_with_capacity(&path, config.buffer_capacity).await?;
        reader.set_read_timeout(config.read_timeout());

        tracing::debug!(path = %path.display(), "opened file storage");
        Ok(Self {
            path,
            reader: Arc::new(Mutex::new(SharedStream::Open(reader))),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once the file handle has been released, either by
    /// [`close`](Self::close) or by a cursor reaching a terminal state.
    pub async fn is_closed(&self) -> bool {
        !self.reader.lock().await.is_open()
    }

    /// Release the file handle now.
    ///
    /// Cursors that pull afterwards report end of sequence. Waits for any
    /// in-flight pull to finish first. Has no effect once the handle has
    /// already been released.
    pub async fn close(&self) {
        let mut shared = self.reader.lock().await;
        if shared.is_open() {
            *shared = SharedStream::Closed;
            tracing::debug!(path = %self.path.display(), "closed file storage");
        }
    }
}

impl RecordSource for FileStorage {
    type Cursor = FileLineCursor;

    fn query(&self, query: Query) -> FileLineCursor {
        tracing::trace!(path = %self.path.display(), ?query, "created cursor");
        FileLineCursor::new(Arc::clone(&self.reader), query)
    }
}
