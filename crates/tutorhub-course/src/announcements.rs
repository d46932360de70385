//! Course announcements

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use tutorhub_http::{ApiClient, ApiError, ApiRequest, Envelope};

use crate::error::{CourseError, CourseResult};
use crate::profile::PersonProfile;
use crate::rest::{fetch, fetch_first, fetch_one};

const BASE: &str = "/api/course/course/announcements";

pub const DEFAULT_ANNOUNCEMENT_PAGE_SIZE: u32 = 10;

pub type AuthorProfile = PersonProfile;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub announcement_id: String,
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub seen: bool,
    /// Timestamp or flag depending on the backend version
    #[serde(default)]
    pub seen_at: Option<Value>,
    #[serde(default)]
    pub author: Option<AuthorProfile>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnseenMeta {
    pub course_id: String,
    #[serde(default)]
    pub unseen_count: u32,
}

/// One page of a course's announcements
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CourseAnnouncements {
    #[serde(default)]
    pub items: Vec<Announcement>,
    #[serde(default)]
    pub unseen: Option<UnseenMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnouncementCreate {
    pub course_id: String,
    pub title: String,
    pub body: String,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnouncementUpdate {
    pub title: String,
    pub body: String,
    pub is_pinned: bool,
}

fn check_title(title: &str) -> CourseResult<()> {
    if title.trim().is_empty() {
        return Err(CourseError::invalid("title must not be blank"));
    }
    Ok(())
}

/// Pull the page out of a list response
///
/// The page arrives either as the `items` object itself or as its first
/// element.
pub(crate) fn extract_page(items: Value) -> CourseResult<CourseAnnouncements> {
    let page = match items {
        Value::Array(values) => values.into_iter().next(),
        Value::Object(map) => Some(Value::Object(map)),
        _ => None,
    };
    match page {
        Some(page) => serde_json::from_value(page)
            .map_err(|e| CourseError::Api(ApiError::Decode(e.to_string()))),
        None => Err(CourseError::NotFound("announcement page".into())),
    }
}

/// Announcement endpoints
#[derive(Debug, Clone)]
pub struct AnnouncementApi {
    client: ApiClient,
}

impl AnnouncementApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, course_id: &str, page: u32, page_size: u32) -> CourseResult<CourseAnnouncements> {
        let req = ApiRequest::get(BASE)
            .query("course_id", course_id)
            .query("page", page)
            .query("page_size", page_size)
            .auth();

        // `items` is not always an array, so split it off before the
        // envelope is decoded
        let mut body: Value = self.client.send(&req).await?;
        let items = body
            .get_mut("items")
            .map(Value::take)
            .unwrap_or(Value::Null);
        let envelope: Envelope<Value> =
            serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        envelope.check()?;

        let page = extract_page(items)?;
        debug!(course_id, count = page.items.len(), "Announcements loaded");
        Ok(page)
    }

    pub async fn item(&self, announcement_id: &str) -> CourseResult<Option<Announcement>> {
        let req = ApiRequest::get(format!("{BASE}/item"))
            .query("announcement_id", announcement_id)
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn create(&self, create: &AnnouncementCreate) -> CourseResult<Announcement> {
        check_title(&create.title)?;
        let req = ApiRequest::post(format!("{BASE}/create")).json(create)?.auth();
        fetch_one(&self.client, &req, "announcement").await
    }

    pub async fn update(&self, announcement_id: &str, update: &AnnouncementUpdate) -> CourseResult<Announcement> {
        check_title(&update.title)?;
        let req = ApiRequest::patch(format!("{BASE}/update"))
            .query("announcement_id", announcement_id)
            .json(update)?
            .auth();
        fetch_one(&self.client, &req, "announcement").await
    }

    pub async fn delete(&self, announcement_id: &str) -> CourseResult<()> {
        let req = ApiRequest::delete(format!("{BASE}/delete"))
            .query("announcement_id", announcement_id)
            .empty_json()
            .auth();
        fetch::<Value>(&self.client, &req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Value {
        json!({
            "items": [{"announcement_id": "a1", "course_id": "c1", "title": "Hi", "body": "b", "is_pinned": false, "seen": false, "seen_at": null}],
            "unseen": {"course_id": "c1", "unseen_count": 1}
        })
    }

    #[test]
    fn test_page_as_object() {
        let page = extract_page(page()).unwrap();
        assert_eq!(page.items[0].announcement_id, "a1");
        assert_eq!(page.unseen.map(|u| u.unseen_count), Some(1));
    }

    #[test]
    fn test_page_as_first_element() {
        let page = extract_page(json!([page()])).unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_missing_page() {
        assert!(matches!(extract_page(json!([])), Err(CourseError::NotFound(_))));
        assert!(matches!(extract_page(Value::Null), Err(CourseError::NotFound(_))));
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(check_title("  ").is_err());
        assert!(check_title("Exam moved").is_ok());
    }
}
