//! Session state and authentication DTOs

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Account type accepted by this client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UserType {
    #[default]
    #[serde(rename = "TEACHER")]
    Teacher,
}

/// Token triple returned by `authenticate`
///
/// `expiration` is a lifetime in minutes, not a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expiration: i64,
}

/// Response of `refresh`; the backend may omit the rotated refresh token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expiration: i64,
}

/// Signed-in state held by [`SessionManager`](crate::SessionManager)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, Unix milliseconds
    pub expiration: i64,
    /// Phone number or e-mail the user signed in with
    pub identifier: String,
}

impl Session {
    /// Build a session from fresh tokens, turning the lifetime into a deadline
    pub fn from_tokens(tokens: AuthTokens, identifier: impl Into<String>, now_ms: i64) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expiration: expiry_from_minutes(tokens.expiration, now_ms),
            identifier: identifier.into(),
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expiration <= now_ms
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}

pub(crate) fn expiry_from_minutes(minutes: i64, now_ms: i64) -> i64 {
    now_ms.saturating_add(minutes.saturating_mul(60 * 1000))
}

/// Outcome shared by every caller of one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { access_token: String },
    Failed,
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed { .. })
    }
}

/// Authentication state broadcast to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

/// Response of `login` and `register`: a one-time code was sent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CodeSentResponse {
    #[serde(default)]
    pub message: String,
    /// Code echoed back by development backends
    #[serde(default)]
    pub mock: Option<String>,
}

/// Response of the password change steps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChangeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub change_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupResponse {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub user_id: String,
    pub phone_number: String,
    pub email: String,
    pub user_type: UserType,
}
