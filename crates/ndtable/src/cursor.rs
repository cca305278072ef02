//! Lazy, filtered cursors over a record source.
//!
//! A cursor is single-pass and forward-only. Each call to [`Cursor::next`]
//! reads lines from the underlying stream until one matches the cursor's
//! query, then returns it. Non-matching lines are consumed inside that call
//! and never observed by the caller.
//!
//! # States
//!
//! ```text
//! Active --match-------------> Active
//! Active --end of data-------> Exhausted --next--> Exhausted
//! Active --read/parse error--> Failed    --next--> Failed
//! ```
//!
//! The error that moves a cursor to [`CursorState::Failed`] is returned
//! exactly once. Later calls return `Ok(None)`; [`Cursor::state`] still
//! tells a failed scan apart from a clean one.
//!
//! Cursors of one source share its stream, so they also share its ending.
//! A cursor that pulls after a sibling drained the file, or after the
//! source was closed, becomes `Exhausted`. One that pulls after a sibling
//! failed becomes `Failed` and returns [`Error::SourceFailed`] once.

use crate::error::{Error, Result};
use crate::source::{SharedReader, SharedStream};
use async_trait::async_trait;
use futures::stream::{self, Stream};
use ndtable_jsonl::{Query, Record};

/// Lifecycle of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// More records may follow.
    Active,
    /// The underlying stream reached end of data.
    Exhausted,
    /// Reading or decoding a line failed, in this cursor or in one sharing
    /// its stream.
    Failed,
}

impl CursorState {
    /// Returns `true` once no further records can be produced.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A single-pass sequence of records produced on demand.
#[async_trait]
pub trait Cursor: Send {
    /// Produce the next matching record, or `None` once the cursor is in a
    /// terminal state.
    ///
    /// This is the only operation that waits on the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns the stream or parse error that ended the scan, or
    /// [`Error::SourceFailed`] if a cursor sharing the stream failed first.
    /// The error is returned once; the cursor is then
    /// [`CursorState::Failed`].
    async fn next(&mut self) -> Result<Option<Record>>;

    /// Number of lines this cursor has consumed, matching or not.
    fn position(&self) -> usize;

    /// Current lifecycle state.
    fn state(&self) -> CursorState;
}

/// Adapts any cursor into a [`Stream`] that ends after the first error.
pub fn into_stream<C: Cursor>(cursor: C) -> impl Stream<Item = Result<Record>> {
    stream::unfold(cursor, |mut cursor| async move {
        match cursor.next().await {
            Ok(Some(record)) => Some((Ok(record), cursor)),
            Ok(None) => None,
            Err(err) => Some((Err(err), cursor)),
        }
    })
}

/// Cursor over a line-delimited JSON file.
///
/// Created by [`FileStorage::query`](crate::source::FileStorage). All
/// cursors of one source pull from the same stream, so a line consumed by
/// one cursor is never seen by another.
///
/// When the stream reaches end of data or fails, the cursor releases the
/// file handle for every cursor sharing it and records which of the two
/// happened.
pub struct FileLineCursor {
    reader: SharedReader,
    query: Query,
    position: usize,
    state: CursorState,
}

impl FileLineCursor {
    pub(crate) fn new(reader: SharedReader, query: Query) -> Self {
        Self {
            reader,
            query,
            position: 0,
            state: CursorState::Active,
        }
    }

    /// The query this cursor filters with.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Converts this cursor into a [`Stream`] of matching records.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> {
        into_stream(self)
    }
}

#[async_trait]
impl Cursor for FileLineCursor {
    async fn next(&mut self) -> Result<Option<Record>> {
        if self.state.is_terminal() {
            return Ok(None);
        }

        let mut shared = self.reader.lock().await;
        let reader = match &mut *shared {
            SharedStream::Open(reader) => reader,
            SharedStream::Failed => {
                tracing::debug!(position = self.position, "source failed earlier");
                self.state = CursorState::Failed;
                return Err(Error::SourceFailed);
            }
            SharedStream::Drained | SharedStream::Closed => {
                tracing::debug!(position = self.position, "source already released");
                self.state = CursorState::Exhausted;
                return Ok(None);
            }
        };

        loop {
            match reader.read_record().await {
                Ok(Some(record)) => {
                    self.position += 1;
                    if self.query.matches(&record) {
                        tracing::trace!(position = self.position, "record matched");
                        return Ok(Some(record));
                    }
                }
                Ok(None) => {
                    tracing::debug!(position = self.position, "cursor exhausted");
                    *shared = SharedStream::Drained;
                    self.state = CursorState::Exhausted;
                    return Ok(None);
                }
                Err(err) => {
                    if err.is_parse() {
                        self.position += 1;
                    }
                    tracing::debug!(position = self.position, error = %err, "cursor failed");
                    *shared = SharedStream::Failed;
                    self.state = CursorState::Failed;
                    return Err(err.into());
                }
            }
        }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn state(&self) -> CursorState {
        self.state
    }
}

impl std::fmt::Debug for FileLineCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLineCursor")
            .field("query", &self.query)
            .field("position", &self.position)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
