//! Error types for the jobscout-pipeline crate.
//!
//! Configuration errors are fatal and surface to the caller; transient
//! provider errors are handled inside the orchestrator (logged, the
//! offending unit of work yields zero records) and never abort a run.

/// Errors that can occur while running the search pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid search profile or pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// An HTTP request to a job board failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a job board response.
    #[error("parse error: {0}")]
    Parse(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for jobscout-pipeline results.
pub type Result<T> = std::result::Result<T, PipelineError>;
