//! Error types for SprintPulse.

use thiserror::Error;

/// Convenience result alias used across the workspace.
pub type Result<T> = std::result::Result<T, SprintPulseError>;

/// All errors a SprintPulse collaborator call can produce.
///
/// Failures are contained at the call site: handlers log and move on to
/// the next event rather than letting an error abort the batch.
#[derive(Debug, Error)]
pub enum SprintPulseError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Work-tracking API error: {0}")]
    Api(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
