//! Command-line interface.
//!
//! Prints the records of a JSONL file that match every `--where`
//! constraint, one JSON value per line.
//!
//! # Example
//!
//! ```bash
//! ndtable storage.dat --where city=Roma
//! ndtable storage.dat -w city=Roma -w id=3 --count
//! RUST_LOG=ndtable=debug ndtable storage.dat --limit 10
//! ```

use crate::config::ScanConfig;
use crate::cursor::Cursor;
use crate::source::{FileStorage, RecordSource};
use anyhow::{Context, Result};
use clap::Parser;
use ndtable_jsonl::Query;
use serde_json::Value;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Query a JSONL file as a read-only table
///
/// Reads the file line by line and prints each record whose fields equal
/// all of the given constraints. A malformed line stops the scan with an
/// error.
#[derive(Parser, Debug)]
#[command(name = "ndtable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSONL file to query
    pub file: PathBuf,

    /// Field constraint as FIELD=VALUE (repeatable)
    ///
    /// VALUE is parsed as JSON when possible (`id=3`, `active=true`,
    /// `parent=null`), otherwise taken as a string (`city=Roma`).
    #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE", value_parser = parse_condition)]
    pub conditions: Vec<(String, Value)>,

    /// Stop after this many matching records
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print only the number of matching records
    #[arg(short, long)]
    pub count: bool,

    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read buffer size in bytes (overrides the configuration file)
    #[arg(long, value_name = "BYTES")]
    pub buffer_capacity: Option<usize>,

    /// Per-line read deadline in milliseconds (overrides the configuration file)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

/// Outcome of a completed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Records written to the output.
    pub matched: usize,
    /// Lines consumed from the file.
    pub lines_read: usize,
}

/// Validate a `--where` argument.
fn parse_condition(s: &str) -> Result<(String, Value), String> {
    Query::parse_assignment(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Parse arguments from the process command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the query from the `--where` constraints.
    #[must_use]
    pub fn query(&self) -> Query {
        self.conditions.iter().cloned().collect()
    }

    /// Resolve the scan configuration: file values first, then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded or the
    /// merged configuration is invalid.
    pub async fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path).await?,
            None => ScanConfig::default(),
        };
        if let Some(capacity) = self.buffer_capacity {
            config.buffer_capacity = capacity;
        }
        if let Some(timeout) = self.timeout_ms {
            config.read_timeout_ms = Some(timeout);
        }
        config.validate()?;
        Ok(config)
    }

    /// Run the scan, writing to standard output.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn execute(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        let result = self.run(&mut out).await;
        out.flush()?;
        result.map(|_| ())
    }

    /// Run the scan, writing matching records (or their count) to `out`.
    ///
    /// Records are written as they are found, so a scan that fails part-way
    /// leaves the records before the failure in `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the file cannot be
    /// opened, a line cannot be read or parsed, or writing fails.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<ScanSummary> {
        let config = self.scan_config().await?;
        let storage = FileStorage::open_with(&self.file, &config)
            .await
            .with_context(|| format!("cannot query {}", self.file.display()))?;

        let mut cursor = storage.query(self.query());
        let mut matched = 0;
        while self.limit.is_none_or(|limit| matched < limit) {
            let Some(record) = cursor
                .next()
                .await
                .with_context(|| format!("scan of {} failed", self.file.display()))?
            else {
                break;
            };
            matched += 1;
            if !self.count {
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
            }
        }

        if self.count {
            writeln!(out, "{matched}")?;
        }
        storage.close().await;

        let summary = ScanSummary {
            matched,
            lines_read: cursor.position(),
        };
        tracing::debug!(
            matched = summary.matched,
            lines_read = summary.lines_read,
            "scan finished"
        );
        Ok(summary)
    }
}
