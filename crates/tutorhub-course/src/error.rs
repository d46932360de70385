//! Course domain errors

use thiserror::Error;
use tutorhub_http::ApiError;

pub type CourseResult<T> = std::result::Result<T, CourseError>;

/// Business rule violations the backend reports by code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusinessRule {
    /// The schedule block collides with another one
    ScheduleOverlap,
    /// A course cannot start with nobody enrolled
    NoStudentsExist,
}

impl BusinessRule {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SCHEDULE_OVERLAP" => Some(BusinessRule::ScheduleOverlap),
            "NO_STUDENTS_EXIST" => Some(BusinessRule::NoStudentsExist),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BusinessRule::ScheduleOverlap => "SCHEDULE_OVERLAP",
            BusinessRule::NoStudentsExist => "NO_STUDENTS_EXIST",
        }
    }

    /// Message shown to the teacher
    pub fn message(&self) -> &'static str {
        match self {
            BusinessRule::ScheduleOverlap => {
                "This time slot overlaps another block in your schedule."
            }
            BusinessRule::NoStudentsExist => {
                "At least one student must be enrolled before the course can start."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CourseError {
    #[error(transparent)]
    Api(ApiError),

    /// A recognised business rule rejected the request
    #[error("{}", .rule.message())]
    Rule {
        rule: BusinessRule,
        #[source]
        source: ApiError,
    },

    /// Input rejected before any request was made
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// The backend answered without the expected record
    #[error("{0} not found")]
    NotFound(String),
}

impl From<ApiError> for CourseError {
    fn from(err: ApiError) -> Self {
        let rule = err.rule_codes().into_iter().find_map(BusinessRule::from_code);
        match rule {
            Some(rule) => CourseError::Rule { rule, source: err },
            None => CourseError::Api(err),
        }
    }
}

impl CourseError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CourseError::Invalid(message.into())
    }

    /// Display message: the rule text, the server's message, or the input problem
    pub fn message(&self) -> String {
        match self {
            CourseError::Api(e) => e.message(),
            other => other.to_string(),
        }
    }

    pub fn rule(&self) -> Option<&BusinessRule> {
        match self {
            CourseError::Rule { rule, .. } => Some(rule),
            _ => None,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            CourseError::Api(e) | CourseError::Rule { source: e, .. } => e.status(),
            _ => 0,
        }
    }
}
