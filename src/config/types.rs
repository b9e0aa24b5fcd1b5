//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_log_filter, default_slow_activation_warn_ms, default_true};
use super::steps::Step;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Replay configuration.
///
/// Every section is optional; an empty file is a valid configuration that
/// replays nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
    /// Registry behaviour.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Metrics collection.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Registry events to replay, in order.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Handler setup calls slower than this are logged at warn level
    /// (default: 250). Zero disables the warning.
    #[serde(default = "default_slow_activation_warn_ms")]
    pub slow_activation_warn_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            slow_activation_warn_ms: default_slow_activation_warn_ms(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Register Prometheus metrics (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Print the Prometheus text exposition after the replay.
    #[serde(default)]
    pub dump: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dump: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.log.filter, "info");
        assert!(!config.log.json);
        assert_eq!(config.registry.slow_activation_warn_ms, 250);
        assert!(config.metrics.enabled);
        assert!(!config.metrics.dump);
        assert!(config.steps.is_empty());
    }

    #[test]
    fn sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
[log]
filter = "route_arbiter=debug"
json = true

[registry]
slow_activation_warn_ms = 0

[metrics]
enabled = false
dump = true
"#,
        )
        .unwrap();
        assert_eq!(config.log.filter, "route_arbiter=debug");
        assert!(config.log.json);
        assert_eq!(config.registry.slow_activation_warn_ms, 0);
        assert!(!config.metrics.enabled);
        assert!(config.metrics.dump);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[registry]\nslow_activation_warn_ms = 10").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.registry.slow_activation_warn_ms, 10);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/route-arbiter.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_bad_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[registry\nbroken").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
