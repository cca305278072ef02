//! Scan configuration.
//!
//! Settings are read from a YAML file with kebab-case keys:
//!
//! ```yaml
//! buffer-capacity: 65536
//! read-timeout-ms: 5000
//! ```
//!
//! Missing keys take their defaults.

use crate::error::{Error, Result};
use ndtable_jsonl::reader::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Configuration applied when opening a record source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Read buffer size in bytes.
    pub buffer_capacity: usize,

    /// Deadline for reading a single line, in milliseconds. `None` waits
    /// indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_ms: Option<u64>,
}

impl ScanConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or is not valid
    /// YAML for this structure. Values are not checked until
    /// [`validate`](Self::validate), so flags can still override them.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded scan configuration");
        Ok(config)
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero buffer capacity or a zero read
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::Config(
                "buffer-capacity must be greater than zero".to_string(),
            ));
        }
        if self.read_timeout_ms == Some(0) {
            return Err(Error::Config(
                "read-timeout-ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the per-line read deadline.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            read_timeout_ms: None,
        }
    }
}
