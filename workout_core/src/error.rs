//! Error types for the workout_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
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

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected input: out-of-order set index, rating outside range, etc.
    /// No state is mutated when this is returned.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Commit refused because no exercise had a logged set
    #[error("No progress recorded: log at least one set before finishing a session")]
    NoProgressRecorded,

    /// Durable write failed; in-memory state must not be treated as committed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Workout plan definition error
    #[error("Plan error: {0}")]
    Plan(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
