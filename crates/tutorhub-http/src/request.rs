//! Request description consumed by [`ApiClient`](crate::ApiClient)

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// A single part of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File {
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

/// Owned multipart form
///
/// `reqwest::multipart::Form` is consumed on send, so the form is kept in
/// this shape and rebuilt for every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field; repeated names are kept (e.g. `course_ids`)
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    /// Append a text field only when a value is present
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    /// Append a file part
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormPart::File {
                file_name: file_name.into(),
                mime_type: mime_type.into(),
                bytes,
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    /// Values of all text fields with the given name
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, p)| match p {
                FormPart::Text(v) => Some(v.as_str()),
                FormPart::File { .. } => None,
            })
            .collect()
    }

    pub(crate) fn to_multipart(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name.clone(), value.clone()),
                FormPart::File {
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime_type)
                        .map_err(|e| ApiError::BuildError(e.to_string()))?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Request payload
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(FormData),
}

/// Method, path, query, body and whether a bearer token is required
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub require_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            require_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::BuildError(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach an empty JSON object, the body most action endpoints expect
    pub fn empty_json(mut self) -> Self {
        self.body = RequestBody::Json(Value::Object(Default::default()));
        self
    }

    /// Attach a multipart form
    pub fn form(mut self, form: FormData) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    /// Require a bearer token
    pub fn auth(mut self) -> Self {
        self.require_auth = true;
        self
    }

    /// Look up a query value
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let req = ApiRequest::get("/api/course/course/item")
            .query("course_id", "c1")
            .query("load_teacher", 1)
            .query_opt("page", None::<u32>)
            .auth();

        assert_eq!(req.method, Method::GET);
        assert!(req.require_auth);
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.query_value("load_teacher"), Some("1"));
    }

    #[test]
    fn test_json_body() {
        let req = ApiRequest::post("/x").json(&json!({"a": 1})).unwrap();
        assert_eq!(req.body, RequestBody::Json(json!({"a": 1})));
        assert!(!req.require_auth);
    }

    #[test]
    fn test_form_keeps_repeated_fields() {
        let form = FormData::new()
            .text("course_ids", "a")
            .text("course_ids", "b")
            .text_opt("week", None::<String>)
            .file("file", "notes.pdf", "application/pdf", vec![1, 2, 3]);

        assert_eq!(form.texts("course_ids"), vec!["a", "b"]);
        assert!(form.texts("week").is_empty());
        assert_eq!(form.parts().len(), 3);
        assert!(form.to_multipart().is_ok());
    }
}
