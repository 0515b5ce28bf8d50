//! Error types for session control and configuration
//!
//! Measurement itself never fails; these cover misuse of the session API and
//! I/O around it.

use crate::session::TakeoffId;

/// Errors from takeoff session commands
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("takeoff not found: {0}")]
    UnknownTakeoff(TakeoffId),

    #[error("takeoff already exists: {0}")]
    DuplicateTakeoff(TakeoffId),

    #[error("no takeoff is being captured")]
    NotCapturing,
}

/// Result type for session commands
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from loading or saving engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
