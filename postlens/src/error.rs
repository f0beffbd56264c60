//! Error taxonomy for the post analysis pipeline.

use thiserror::Error;

/// Result type for pipeline stage operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors a pipeline stage can surface to its caller.
///
/// Every variant carries the human-readable message returned to the client.
/// Stages fail fast on the first error; there is no retry or partial result.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller input malformed; detected before any external call
    #[error("{0}")]
    Validation(String),

    /// Referenced remote resource absent
    #[error("{0}")]
    NotFound(String),

    /// Credential invalid or expired
    #[error("{0}")]
    Auth(String),

    /// Remote throttling
    #[error("{0}")]
    RateLimit(String),

    /// Remote access denied
    #[error("{0}")]
    Permission(String),

    /// Remote service returned a structured error payload; message passed through
    #[error("{0}")]
    Provider(String),

    /// Catch-all transport/parse failure
    #[error("{0}")]
    Unavailable(String),
}
