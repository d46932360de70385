//! The `{code, message, items, errors, meta}` wrapper used by list endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// One entry of an envelope's `errors` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeError {
    #[serde(default)]
    pub input_index: i64,
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Standard list response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Vec::new", deserialize_with = "nullable_vec")]
    pub items: Vec<T>,
    #[serde(default = "Vec::new", deserialize_with = "nullable_vec")]
    pub errors: Vec<EnvelopeError>,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Envelope<T> {
    /// Build a successful envelope (used by tests and local fixtures)
    pub fn ok(items: Vec<T>) -> Self {
        Self {
            code: 200,
            message: "OK".to_string(),
            items,
            errors: Vec::new(),
            meta: None,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Take the first item, failing when the envelope is empty
    pub fn into_first(self) -> Result<T> {
        self.items.into_iter().next().ok_or(ApiError::EmptyEnvelope)
    }

    /// Take the first item if present
    pub fn into_first_opt(self) -> Option<T> {
        self.items.into_iter().next()
    }

    /// String value of a `meta` key
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.as_ref()?.get(key)?.as_str()
    }

    /// Turn a business failure reported inside a 2xx body into an error
    ///
    /// Some endpoints answer 200 with `code: 422` and an `errors` array
    /// instead of failing at the HTTP level.
    pub fn check(self) -> Result<Self> {
        if self.code == 422 || (self.code >= 400 && !self.errors.is_empty()) {
            let message = self
                .errors
                .first()
                .map(|e| e.detail.clone())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| self.message.clone());
            let detail = serde_json::json!({
                "code": self.code,
                "message": self.message,
                "errors": self.errors,
            });
            return Err(ApiError::Validation {
                message,
                errors: self.errors,
                detail: Some(detail),
            });
        }
        Ok(self)
    }
}
