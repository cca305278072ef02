//! Streaming operations for JSONL data.
//!
//! These adapters turn an owned [`JsonlReader`] into a lazy
//! [`Stream`](futures::Stream). Lines are read only when the stream is
//! polled, one at a time, so memory use stays constant regardless of file
//! size. The first error ends the stream: it is yielded once and nothing
//! follows it.

use crate::Record;
use crate::error::Result;
use crate::query::Query;
use crate::reader::JsonlReader;
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Converts the reader into a stream of values, one per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::StreamExt;
    /// use ndtable_jsonl::JsonlReader;
    /// use std::io::Cursor;
    /// use std::pin::pin;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let reader = JsonlReader::new(Cursor::new(b"1\n2\n3\n".to_vec()));
    /// let values: Vec<u32> = pin!(reader.stream::<u32>())
    ///     .map(|r| r.unwrap())
    ///     .collect()
    ///     .await;
    /// assert_eq!(values, vec![1, 2, 3]);
    /// # }
    /// ```
    pub fn stream<T: DeserializeOwned>(self) -> impl Stream<Item = Result<T>> {
        stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.read_line::<T>().await {
                Ok(Some(value)) => Some((Ok(value), Some(reader))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }

    /// Converts the reader into a stream of the records matching `query`.
    ///
    /// Non-matching records are read and discarded inside a single poll;
    /// the stream only yields matches, in file order.
    pub fn select(self, query: Query) -> impl Stream<Item = Result<Record>> {
        stream::unfold(Some((self, query)), |state| async move {
            let (mut reader, query) = state?;
            loop {
                match reader.read_record().await {
                    Ok(Some(record)) if query.matches(&record) => {
                        tracing::trace!(line = reader.line_number(), "record matched");
                        return Some((Ok(record), Some((reader, query))));
                    }
                    Ok(Some(_)) => {}
                    Ok(None) => return None,
                    Err(err) => {
                        tracing::debug!(error = %err, "stopping JSONL selection");
                        return Some((Err(err), None));
                    }
                }
            }
        })
    }
}
