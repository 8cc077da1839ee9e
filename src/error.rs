//! Error types for the jobscout application shell.

/// Top-level error type for config loading and result persistence.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Profile, CV, or skill corpus file error.
    #[error("config error: {0}")]
    Config(String),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encode/decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
