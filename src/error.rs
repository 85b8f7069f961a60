//! Error types for configuration loading and page parsing.
//!
//! Fetching and metrics publication never fail with an error: both degrade
//! to "no data" and log instead. Only the conditions below are surfaced.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected schema
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// `INFLUXDB_PORT` is set but is not a port number
    #[error("Invalid InfluxDB port: {0}")]
    InvalidPort(String),
}

/// The scraped page does not have the structure the parser relies on.
///
/// Any of these means the site layout changed and every downstream number
/// would be garbage, so extraction stops instead of guessing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Location summary does not start with {expected:?}: {text:?}")]
    UnexpectedSummaryText { expected: &'static str, text: String },

    #[error("Location summary has no per-area price segment: {0:?}")]
    MissingPerAreaPrice(String),

    #[error("Listing #{index} is missing its {field}")]
    MissingListingField { index: usize, field: &'static str },
}
