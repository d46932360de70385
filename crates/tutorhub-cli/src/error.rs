// CLI error types

use thiserror::Error;
use tutorhub_config::ConfigError;
use tutorhub_course::CourseError;
use tutorhub_http::ApiError;
use tutorhub_lecture::LectureError;
use tutorhub_session::SessionError;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Lecture unavailable: {0}")]
    LectureUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Course(#[from] CourseError),

    #[error(transparent)]
    Lecture(#[from] LectureError),
}

impl CliError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'tutorhub help' for usage information.",
                    message
                )
            }
            CliError::NotSignedIn => {
                "You are not signed in.\n\nRun 'tutorhub login --phone <NUMBER>' first.".to_string()
            }
            CliError::LectureUnavailable(reason) => {
                format!("Cannot enter the lecture: {}", reason)
            }
            CliError::Io(e) => format!("Terminal IO failed: {}", e),
            CliError::Config(e) => format!(
                "{}\n\nCheck the file given with --config or the TUTORHUB_* environment variables.",
                e
            ),
            CliError::Api(e) if e.is_unauthorized() => format!(
                "{}\n\nYour session has ended. Run 'tutorhub login' again.",
                e.message()
            ),
            CliError::Api(e) => e.message(),
            CliError::Session(SessionError::Api(e)) => e.message(),
            CliError::Session(e) => e.to_string(),
            CliError::Course(e) => e.message(),
            CliError::Lecture(e) => e.message(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
