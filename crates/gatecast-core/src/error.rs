//! Error types for gatecast-core
//!
//! The normalization layer itself fails open and never returns these.
//! They cover the edges: timestamp parsing, configuration and the API client.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gatecast operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Input Errors
    // ===================
    #[error("Invalid timestamp '{value}': expected RFC 3339 or YYYY-MM-DDTHH:MM[:SS]")]
    InvalidTimestamp { value: String },

    #[error("Invalid time window: {reason}")]
    InvalidWindow { reason: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Client Errors
    // ===================
    #[error("Request to {endpoint} failed")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl CoreError {
    /// Actionable hint for the CLI, when there is one
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CoreError::InvalidTimestamp { .. } => {
                Some("Use a value like 2024-01-31T23:00 or 2024-01-31T23:00:00+04:00".to_string())
            }
            CoreError::ConfigRead { path, .. } => {
                Some(format!("Check permissions: chmod +r {}", path.display()))
            }
            CoreError::ConfigParse { .. } => {
                Some("Validate TOML syntax of the config file".to_string())
            }
            CoreError::Http { .. } => {
                Some("Check that the forecasting API is reachable (GATECAST_API_URL)".to_string())
            }
            _ => None,
        }
    }
}

/// Severity of a data-quality event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Value was defaulted, rendering continues normally
    Warning,
    /// Record or payload was dropped
    Error,
}
