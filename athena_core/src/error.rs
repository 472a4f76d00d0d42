//! Error types for the athena_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for athena_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid session or configuration, raised before anything runs
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Program tracker error
    #[error("Program error: {0}")]
    Program(String),

    /// Workout authoring service error
    #[error("Generation error: {0}")]
    Generation(String),

    /// Narration service error
    #[error("Narration error: {0}")]
    Narration(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
