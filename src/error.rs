//! Error types for the trainer library

/// Main trainer error type
#[derive(Debug, thiserror::Error)]
pub enum NBackError {
    /// Filesystem failure while reading or writing preferences
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Preference file could not be encoded or decoded
    #[error("preference encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialized
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, NBackError>;
