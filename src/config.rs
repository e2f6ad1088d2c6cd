//! Pipeline configuration
//!
//! Settings are read from an optional TOML file; any field left out keeps
//! its default. The binary applies command-line overrides on top.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::storage::StorageFormat;

/// Runtime settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of entities the producer generates
    pub item_count: usize,
    /// Capacity of the producer → consumer channel
    pub channel_capacity: usize,
    /// Lower bound of the producer's randomized delay (inclusive)
    pub min_delay_ms: u64,
    /// Upper bound of the producer's randomized delay (inclusive)
    pub max_delay_ms: u64,
    /// Observer tick
    pub poll_interval_ms: u64,
    /// Pause between consumer completion and stopping the observer
    pub settle_delay_ms: u64,
    /// Grace window after an external termination request
    pub shutdown_timeout_ms: u64,
    /// Directory for persisted tasks and notes; `None` keeps everything in memory
    pub data_dir: Option<PathBuf>,
    /// Preferred on-disk format
    pub format: StorageFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            item_count: 10,
            channel_capacity: 10,
            min_delay_ms: 100,
            max_delay_ms: 400,
            poll_interval_ms: 200,
            settle_delay_ms: 500,
            shutdown_timeout_ms: 3000,
            data_dir: None,
            format: StorageFormat::Json,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file
    ///
    /// # Arguments
    /// * `path` - Path to a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(Error::Config("channel_capacity must be at least 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be greater than 0".to_string()));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(Error::Config(format!(
                "min_delay_ms ({}) is greater than max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.item_count, 10);
        assert_eq!(config.channel_capacity, 10);
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            item_count = 4
            poll_interval_ms = 50
            format = "csv"
            data_dir = "/tmp/pipeline"
            "#,
        )
        .unwrap();

        assert_eq!(config.item_count, 4);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.format, StorageFormat::Csv);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/pipeline")));
        assert_eq!(config.max_delay_ms, 400);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml("channel_capacity = 0"),
            Err(Error::Config(_))
        ));
        assert!(PipelineConfig::from_toml("poll_interval_ms = 0").is_err());
        assert!(PipelineConfig::from_toml("min_delay_ms = 500\nmax_delay_ms = 100").is_err());
        assert!(PipelineConfig::from_toml("format = \"xml\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "item_count = 7").unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.item_count, 7);

        assert!(PipelineConfig::load("/nonexistent/pipeline.toml").is_err());
    }
}
