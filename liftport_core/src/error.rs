//! Error types for the liftport_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying syntax error carried by [`Error::Decode`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeSource {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Core error type for liftport_core operations
///
/// All parse failures are file-level and terminal for the upload: no
/// partial parse result is ever returned. Row-level anomalies inside an
/// otherwise-valid file are never escalated here; they degrade per the
/// parser rules (skip row, drop field, fallback string).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Detection could not classify the input
    #[error("unrecognized import format")]
    Format,

    /// A mandatory discriminator or required column is missing
    #[error("{format}: missing required field '{field}'")]
    Schema {
        format: &'static str,
        field: &'static str,
    },

    /// A CSV file has a header but zero data rows
    #[error("{format}: no data rows")]
    EmptyData { format: &'static str },

    /// Underlying JSON/CSV syntax is malformed
    #[error("{format}: decode error: {source}")]
    Decode {
        format: &'static str,
        #[source]
        source: DecodeSource,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
