//! Source collector abstraction.
//!
//! Every raw data source is wrapped in a [`Collector`] that normalizes its
//! native layout into a [`CanonicalRecord`]. Implementations in this crate:
//! - [`StaticCollector`]: an already-canonical record held in memory
//! - [`JsonFileCollector`]: a canonical record stored as JSON on disk
//! - [`crate::collectors::GuineaCollector`]: Guinea situation-report tables
//! - [`crate::collectors::CountryTimeseriesCollector`]: per-country case/death columns
//!
//! New sources are added by implementing the trait; the aggregator only sees
//! the trait object.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;

use crate::canonical::CanonicalRecord;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unrecognized date {0:?}")]
    InvalidDate(String),
    #[error("timed out after {0} ms")]
    TimedOut(u128),
    #[error("collector task panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Other(String),
}

/// One raw data source.
///
/// Implementations must be `Send + Sync` so the aggregator can run them on
/// independent tasks. They must not share mutable state with each other.
pub trait Collector: Send + Sync {
    /// Stable identifier used in logs and failure reports.
    fn name(&self) -> &str;

    /// Extract and normalize this source's records.
    fn collect(&self) -> BoxFuture<'_, Result<CanonicalRecord, CollectorError>>;
}

/// A record that is already in canonical form.
#[derive(Debug, Clone)]
pub struct StaticCollector {
    name: String,
    record: CanonicalRecord,
}

impl StaticCollector {
    pub fn new(name: impl Into<String>, record: CanonicalRecord) -> Self {
        Self {
            name: name.into(),
            record,
        }
    }
}

impl Collector for StaticCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> BoxFuture<'_, Result<CanonicalRecord, CollectorError>> {
        let record = self.record.clone();
        Box::pin(async move { Ok(record) })
    }
}

/// Canonical record read from a JSON file each time it is collected.
#[derive(Debug, Clone)]
pub struct JsonFileCollector {
    name: String,
    path: PathBuf,
}

impl JsonFileCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Collector for JsonFileCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> BoxFuture<'_, Result<CanonicalRecord, CollectorError>> {
        Box::pin(async move {
            let path = self.path.display().to_string();
            let text = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CollectorError::Io {
                    path: path.clone(),
                    source,
                })?;
            CanonicalRecord::from_json_str(&text).map_err(|source| CollectorError::Parse { path, source })
        })
    }
}
