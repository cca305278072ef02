//! Streaming, filtered reading of JSONL (JSON Lines) records.
//!
//! This library reads JSONL data line by line, decodes each line as a JSON
//! value, and filters the records with exact-match [`Query`] predicates.
//! Reading is lazy and forward-only; malformed lines are reported as errors
//! rather than skipped.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod query;
pub mod reader;
pub mod stream;

pub use error::{Error, Result};
pub use query::Query;
pub use reader::JsonlReader;

/// A decoded JSONL line.
///
/// Usually an object mapping field names to values. Any other JSON value
/// has no fields, so it only satisfies an empty [`Query`].
pub type Record = serde_json::Value;
