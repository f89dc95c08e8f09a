//! Engine configuration types.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnnexError, Result};
use crate::vector::index::config::HnswConfig;

/// Configuration for an [`AnnEngine`](crate::engine::AnnEngine).
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides:
///
/// ```
/// use annex::engine::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{"hnsw": {"ef_search": 100}}"#).unwrap();
/// assert_eq!(config.hnsw.ef_search, 100);
/// assert_eq!(config.hnsw.m, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Graph build and search parameters.
    pub hnsw: HnswConfig,
    /// Size of the query worker pool. `None` uses rayon's global pool.
    pub num_threads: Option<usize>,
    /// Fan queries out across worker threads.
    pub parallel_queries: bool,
    /// Deadline for a whole request (build plus queries), in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hnsw: HnswConfig::default(),
            num_threads: None,
            parallel_queries: true,
            timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the HNSW parameters.
    pub fn with_hnsw(mut self, hnsw: HnswConfig) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Set the worker pool size.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set the request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Request deadline as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        self.hnsw.validate()?;
        if self.num_threads == Some(0) {
            return Err(AnnexError::invalid_config("num_threads must be > 0"));
        }
        Ok(())
    }
}
