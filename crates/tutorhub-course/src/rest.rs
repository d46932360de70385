//! Envelope plumbing shared by the API wrappers

use serde::de::DeserializeOwned;
use tutorhub_http::{ApiClient, ApiRequest, Envelope};

use crate::error::{CourseError, CourseResult};

/// Send a request and reject business failures carried in a 2xx envelope
pub(crate) async fn fetch<T: DeserializeOwned>(
    client: &ApiClient,
    request: &ApiRequest,
) -> CourseResult<Envelope<T>> {
    let envelope: Envelope<T> = client.send(request).await?;
    Ok(envelope.check()?)
}

pub(crate) async fn fetch_items<T: DeserializeOwned>(
    client: &ApiClient,
    request: &ApiRequest,
) -> CourseResult<Vec<T>> {
    Ok(fetch(client, request).await?.items)
}

pub(crate) async fn fetch_first<T: DeserializeOwned>(
    client: &ApiClient,
    request: &ApiRequest,
) -> CourseResult<Option<T>> {
    Ok(fetch(client, request).await?.into_first_opt())
}

/// First item or `NotFound(what)`
pub(crate) async fn fetch_one<T: DeserializeOwned>(
    client: &ApiClient,
    request: &ApiRequest,
    what: &str,
) -> CourseResult<T> {
    fetch_first(client, request)
        .await?
        .ok_or_else(|| CourseError::NotFound(what.to_string()))
}

/// Percent-encode one path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Accept `"12.50"`, `12.5` or `null` for a string field
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Treat `null` like a missing list
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
