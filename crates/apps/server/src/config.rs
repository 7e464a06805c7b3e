use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use ingest::MergeStrategy;

const DEFAULT_ADDR: &str = "127.0.0.1:9200";
const DEFAULT_COLLECT_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Gazetteer JSON; the built-in dictionary is used when unset.
    pub gazetteer: Option<PathBuf>,
    /// Canonical-record JSON files, one collector each.
    pub data_files: Vec<PathBuf>,
    pub collect_timeout: Option<Duration>,
    pub merge: MergeStrategy,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr = lookup("OUTBREAK_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .context("invalid OUTBREAK_ADDR")?;

        let gazetteer = lookup("OUTBREAK_GAZETTEER")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let data_files = lookup("OUTBREAK_DATA")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();

        let timeout_ms = lookup("OUTBREAK_COLLECT_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COLLECT_TIMEOUT_MS);
        let collect_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

        let merge = match lookup("OUTBREAK_MERGE") {
            Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
            None => MergeStrategy::default(),
        };

        Ok(Self {
            addr,
            gazetteer,
            data_files,
            collect_timeout,
            merge,
        })
    }
}
