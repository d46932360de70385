//! Session handling for the tutorhub teacher client
//!
//! Holds the signed-in tokens, persists them across runs, refreshes them
//! single-flight when the backend answers 401, and talks to the
//! `/api/authenticate/` endpoints.

pub mod auth;
pub mod error;
pub mod manager;
pub mod models;
pub mod store;

pub use auth::{AuthApi, DeviceInfo};
pub use error::{SessionError, SessionResult};
pub use manager::SessionManager;
pub use models::{
    now_millis, AuthState, AuthTokens, ChangeResponse, CodeSentResponse, LookupResponse,
    RefreshOutcome, RefreshResponse, Session, UserInfo, UserType,
};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_KEY};
pub use tutorhub_config::ExpiredSessionPolicy;
