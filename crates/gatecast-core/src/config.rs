//! Runtime configuration
//!
//! Loaded from `<config_dir>/gatecast/config.toml` (or an explicit path). A
//! missing file is not an error: every field has a default matching the
//! production deployment.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "GATECAST_API_URL";

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_capacity_per_hour() -> f64 {
    60.0
}

fn default_utc_offset_hours() -> i32 {
    // Asia/Dubai, no DST
    4
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatecastConfig {
    /// Base URL of the forecasting API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Capacity used when a response carries none
    #[serde(default = "default_capacity_per_hour")]
    pub default_capacity_per_hour: f64,

    /// Terminal wall-clock offset used for window computation
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Polling period of live views
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatecastConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            default_capacity_per_hour: default_capacity_per_hour(),
            utc_offset_hours: default_utc_offset_hours(),
            refresh_interval_secs: default_refresh_interval_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GatecastConfig {
    /// `<config_dir>/gatecast/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gatecast").join("config.toml"))
    }

    /// Load, apply environment overrides, validate.
    ///
    /// With `path = None` the default location is used; a missing file at
    /// either location yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            message: source.message().to_string(),
            source,
        })
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(url = %url, "API base URL overridden from environment");
            self.api_base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |message: String| Err(CoreError::InvalidConfig { message });

        if self.api_base_url.trim().is_empty() {
            return invalid("api_base_url must not be empty".to_string());
        }
        if !(self.default_capacity_per_hour > 0.0) {
            return invalid(format!(
                "default_capacity_per_hour must be positive, got {}",
                self.default_capacity_per_hour
            ));
        }
        if self.refresh_interval_secs == 0 {
            return invalid("refresh_interval_secs must be positive".to_string());
        }
        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs must be positive".to_string());
        }
        if self.cache_ttl_secs == 0 {
            return invalid("cache_ttl_secs must be positive".to_string());
        }
        if FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600)).is_none() {
            return invalid(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Terminal wall-clock offset; falls back to UTC if out of range
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600))
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = GatecastConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.default_capacity_per_hour, 60.0);
        assert_eq!(config.offset().local_minus_utc(), 4 * 3600);
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"http://forecast.internal:9000/\"").unwrap();
        writeln!(file, "cache_ttl_secs = 5").unwrap();

        let config = GatecastConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.base_url(), "http://forecast.internal:9000");
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = GatecastConfig::load(Some(&path)).unwrap();
        assert_eq!(config.refresh_interval_secs, 60);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = \"soon\"").unwrap();

        let err = GatecastConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = GatecastConfig {
            api_base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { .. })
        ));

        let config = GatecastConfig {
            refresh_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GatecastConfig {
            utc_offset_hours: 30,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GatecastConfig {
            default_capacity_per_hour: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = GatecastConfig::default();
        config.apply_env_overrides(|key| {
            (key == API_URL_ENV).then(|| "http://10.0.0.5:8000".to_string())
        });
        assert_eq!(config.api_base_url, "http://10.0.0.5:8000");

        config.apply_env_overrides(|_| Some(String::new()));
        assert_eq!(config.api_base_url, "http://10.0.0.5:8000");
    }
}
