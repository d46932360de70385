//! Request layer for the tutorhub teacher client
//!
//! Wraps reqwest with the conventions every backend call shares:
//!
//! - **Bearer auth**: tokens come from a [`SessionProvider`] given at construction
//! - **Single retry**: a 401 triggers one refresh and one retry, never more
//! - **Structured errors**: network, unauthorized, validation and status failures
//! - **Envelopes**: the `{code, message, items, errors, meta}` list wrapper
//! - **Multipart**: owned form data that survives the retry

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod request;
pub mod session;

pub use client::ApiClient;
pub use config::HttpConfig;
pub use envelope::{Envelope, EnvelopeError};
pub use error::{ApiError, Result};
pub use request::{ApiRequest, FormData, FormPart, RequestBody};
pub use session::{SessionProvider, StaticToken};

/// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
