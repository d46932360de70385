//! Lecture error types

use thiserror::Error;
use tutorhub_http::ApiError;

pub type LectureResult<T> = std::result::Result<T, LectureError>;

/// Failure reported by the conferencing SDK
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct VideoError(pub String);

impl VideoError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum LectureError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend issued an empty join token
    #[error("Join token missing")]
    MissingJoinToken,

    /// The backend did not accept its own join token
    #[error("Token verification failed")]
    TokenRejected,

    /// A join flow for this course is already running
    #[error("Already joining this lecture")]
    JoinInProgress,

    /// Entering the lecture view without a token or topic
    #[error("Missing join token or lesson topic")]
    MissingTicket,

    #[error("Video error: {0}")]
    Video(#[from] VideoError),
}

impl LectureError {
    /// Message suitable for display next to the lecture card
    pub fn message(&self) -> String {
        match self {
            LectureError::Api(e) => e.message(),
            other => other.to_string(),
        }
    }
}
