//! Error handling module for crypttui
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the application should use these types for consistency.

use thiserror::Error;

/// Main error type for crypttui
#[derive(Error, Debug)]
pub enum CryptTuiError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A shell command failed, either because it could not be invoked
    /// (executable missing, permission denied) or because it exited non-zero.
    /// The message carries the captured stderr or the invocation error text.
    #[error("{program}: {message}")]
    Command { program: String, message: String },

    /// The device listing produced output we could not make sense of.
    #[error("Device listing error: {0}")]
    Listing(String),

    /// JSON deserialization errors from `lsblk --json`
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for crypttui operations
pub type Result<T> = std::result::Result<T, CryptTuiError>;

impl CryptTuiError {
    /// Create a command error for a failed invocation of `program`.
    pub fn command(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Create a device listing error
    pub fn listing(msg: impl Into<String>) -> Self {
        Self::Listing(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
