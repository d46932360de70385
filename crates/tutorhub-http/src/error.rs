//! Request layer error types

use serde_json::Value;
use thiserror::Error;

use crate::envelope::EnvelopeError;

/// Result type for request layer operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Fallback message when the server body carries neither `detail` nor `message`
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// Errors surfaced by [`ApiClient`](crate::ApiClient)
///
/// Every variant maps onto the `{status, message, detail}` triple the views
/// display; see [`ApiError::status`], [`ApiError::message`] and
/// [`ApiError::detail`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached (status 0)
    #[error("Network error: cannot reach server ({source})")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// Authentication failed and could not be recovered by a refresh
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Business or validation failure (422)
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<EnvelopeError>,
        detail: Option<Value>,
    },

    /// Any other non-2xx response
    #[error("HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
        detail: Option<Value>,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The envelope carried no items where one was required
    #[error("Response contained no items")]
    EmptyEnvelope,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

impl ApiError {
    /// Build the `Unauthorized` variant with a message
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
        }
    }

    /// Normalize a non-2xx response body into a structured error
    pub fn from_response(status: reqwest::StatusCode, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| {
                b.get("detail")
                    .and_then(Value::as_str)
                    .or_else(|| b.get("message").and_then(Value::as_str))
            })
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
            .to_string();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized { message };
        }

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let errors = body
                .as_ref()
                .and_then(|b| b.get("errors"))
                .and_then(|e| serde_json::from_value::<Vec<EnvelopeError>>(e.clone()).ok())
                .unwrap_or_default();
            return ApiError::Validation {
                message,
                errors,
                detail: body,
            };
        }

        ApiError::Status {
            status,
            message,
            detail: body,
        }
    }

    /// HTTP status code (0 for transport and client-side failures)
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Network { .. } => 0,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Validation { .. } => 422,
            ApiError::Status { status, .. } => status.as_u16(),
            _ => 0,
        }
    }

    /// Human readable message
    pub fn message(&self) -> String {
        match self {
            ApiError::Network { .. } => "Network error: cannot reach server".to_string(),
            ApiError::Unauthorized { message }
            | ApiError::Validation { message, .. }
            | ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Raw server body, when one was returned
    pub fn detail(&self) -> Option<&Value> {
        match self {
            ApiError::Validation { detail, .. } | ApiError::Status { detail, .. } => {
                detail.as_ref()
            }
            _ => None,
        }
    }

    /// Structured errors of a 422 response
    pub fn validation_errors(&self) -> &[EnvelopeError] {
        match self {
            ApiError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Business rule codes carried by the error, in order
    ///
    /// Looks at `errors[].detail`, `errors[].error_code` and a string `detail`
    /// field of the body.
    pub fn rule_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .validation_errors()
            .iter()
            .flat_map(|e| [e.detail.as_str(), e.error_code.as_str()])
            .filter(|c| !c.is_empty())
            .collect();
        if let Some(code) = self.detail().and_then(|d| d.get("detail")).and_then(Value::as_str) {
            codes.push(code);
        }
        codes
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_message_prefers_detail() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            Some(json!({"detail": "bad course", "message": "ignored"})),
        );
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "bad course");
    }

    #[test]
    fn test_message_falls_back() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.message(), DEFAULT_ERROR_MESSAGE);
        assert!(err.detail().is_none());

        let err = ApiError::from_response(StatusCode::NOT_FOUND, Some(json!({"message": "gone"})));
        assert_eq!(err.message(), "gone");
    }

    #[test]
    fn test_unprocessable_collects_errors() {
        let body = json!({
            "code": 422,
            "message": "rejected",
            "errors": [{"input_index": 0, "error_code": "CONFLICT", "detail": "SCHEDULE_OVERLAP"}]
        });
        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, Some(body));
        assert_eq!(err.status(), 422);
        assert_eq!(err.validation_errors().len(), 1);
        assert!(err.rule_codes().contains(&"SCHEDULE_OVERLAP"));
    }

    #[test]
    fn test_unauthorized_status() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, None);
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), 401);
    }
}
