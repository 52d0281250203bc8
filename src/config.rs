use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use fwscope_types::LogFilters;

/// Default number of records kept on display
pub const DEFAULT_LIMIT: usize = 1000;

/// Default toast lifetime in milliseconds
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Viewer settings loaded from a TOML file
///
/// ```toml
/// limit = 500
/// toast_duration_ms = 5000
///
/// [filters]
/// action = "block"
/// direction = "in"
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Maximum records on display
    pub limit: usize,

    /// Filters applied when none are given on the command line
    pub filters: LogFilters,

    /// Toast lifetime; 0 keeps toasts until dismissed
    pub toast_duration_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            filters: LogFilters::default(),
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
        }
    }
}

impl ViewerConfig {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ViewerConfig::from_toml("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.limit, DEFAULT_LIMIT);
        assert_eq!(config.toast_duration(), Duration::from_millis(3000));
    }

    #[test]
    fn test_partial_config() {
        let config = ViewerConfig::from_toml(
            r#"
            limit = 50

            [filters]
            action = "block"
            "#,
        )
        .unwrap();

        assert_eq!(config.limit, 50);
        assert_eq!(config.filters, LogFilters::new("block", "", ""));
        assert_eq!(config.toast_duration_ms, DEFAULT_TOAST_DURATION_MS);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ViewerConfig::from_toml("limt = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerConfig::load(Path::new("/nonexistent/fwscope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/fwscope.toml"));
    }
}
