//! Session error types

use thiserror::Error;
use tutorhub_http::ApiError;

/// Result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors raised by the session manager and its store
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisted session could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation needs a signed-in session
    #[error("Not authenticated")]
    NotAuthenticated,
}
