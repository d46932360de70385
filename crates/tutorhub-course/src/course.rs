//! Courses, their lifecycle and draft reviews

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use tutorhub_http::{ApiClient, ApiRequest, FormData};

use crate::curriculum::{Level, Subbranch};
use crate::error::CourseResult;
use crate::rest::{fetch_first, fetch_items, fetch_one, string_or_number};
use crate::upload::Upload;

const BASE: &str = "/api/course/course";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    Draft,
    Published,
    Ongoing,
    Cancelled,
    Completed,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "DRAFT",
            CourseStatus::Published => "PUBLISHED",
            CourseStatus::Ongoing => "ONGOING",
            CourseStatus::Cancelled => "CANCELLED",
            CourseStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseType {
    Questions,
    Lecture,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Pending,
    Approved,
    Rejected,
}

/// A course as the backend returns it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRead {
    pub course_id: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub course_level: Option<Level>,
    #[serde(default)]
    pub course_subbranch: Option<Subbranch>,
    #[serde(default)]
    pub course_students: i64,
    #[serde(default)]
    pub course_capacity: i64,
    /// Decimal amount; the backend sends it as a string or a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub course_price: String,
    pub course_status: CourseStatus,
    #[serde(default)]
    pub completed_lessons: i64,
    #[serde(default)]
    pub total_lessons: i64,
    #[serde(default)]
    pub course_difficulty: Option<CourseDifficulty>,
    #[serde(default)]
    pub course_type: Option<CourseType>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub teacher_overview: Option<Value>,
}

impl CourseRead {
    /// Content can only be changed while the course is a draft
    pub fn is_editable(&self) -> bool {
        self.course_status == CourseStatus::Draft
    }

    /// Weekly blocks may change until the course is finished or cancelled
    pub fn is_schedulable(&self) -> bool {
        matches!(
            self.course_status,
            CourseStatus::Draft | CourseStatus::Published | CourseStatus::Ongoing
        )
    }

    pub fn can_start(&self) -> bool {
        self.course_status == CourseStatus::Published
    }
}

/// Partial course update; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CourseUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lessons: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<CourseDifficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_type: Option<CourseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subbranch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_id: Option<String>,
}

impl CourseUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A publication review request for a draft course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseDraft {
    pub draft_id: String,
    pub course_id: String,
    pub status: DraftStatus,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub applicant_comment: Option<String>,
    #[serde(default)]
    pub reviewer_comment: Option<String>,
    #[serde(default)]
    pub decided_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftRequest {
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_comment: Option<String>,
}

/// Course endpoints
#[derive(Debug, Clone)]
pub struct CourseApi {
    client: ApiClient,
}

impl CourseApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn by_teacher(&self, teacher_id: &str) -> CourseResult<Vec<CourseRead>> {
        let req = ApiRequest::get(format!("{BASE}/by-teacher"))
            .query("teacher_id", teacher_id)
            .auth();
        fetch_items(&self.client, &req).await
    }

    /// Several courses in one call; ids go out as `course_ids[0]`, `course_ids[1]`, ...
    pub async fn batch(
        &self,
        course_ids: &[String],
        include_teacher_overview: bool,
    ) -> CourseResult<Vec<CourseRead>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut req = ApiRequest::get(format!("{BASE}/batch"))
            .query("include_teacher_overview", flag(include_teacher_overview));
        for (i, id) in course_ids.iter().enumerate() {
            req = req.query(format!("course_ids[{i}]"), id);
        }
        fetch_items(&self.client, &req.auth()).await
    }

    pub async fn item(&self, course_id: &str, load_teacher: bool) -> CourseResult<Option<CourseRead>> {
        let req = ApiRequest::get(format!("{BASE}/item"))
            .query("course_id", course_id)
            .query("load_teacher", flag(load_teacher))
            .auth();
        fetch_first(&self.client, &req).await
    }

    /// Create an empty draft, optionally with a start date (`YYYY-MM-DD`)
    pub async fn create(&self, start_date: Option<&str>) -> CourseResult<CourseRead> {
        let req = ApiRequest::post(format!("{BASE}/create"))
            .query_opt("start_date", start_date)
            .empty_json()
            .auth();
        let course: CourseRead = fetch_one(&self.client, &req, "created course").await?;
        info!(course_id = %course.course_id, "Course draft created");
        Ok(course)
    }

    pub async fn update(
        &self,
        course_id: &str,
        update: &CourseUpdateRequest,
    ) -> CourseResult<Option<CourseRead>> {
        let req = ApiRequest::patch(format!("{BASE}/update"))
            .query("course_id", course_id)
            .json(update)?
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn start(&self, course_id: &str) -> CourseResult<Option<CourseRead>> {
        self.transition("start", course_id).await
    }

    pub async fn cancel(&self, course_id: &str) -> CourseResult<Option<CourseRead>> {
        self.transition("cancel", course_id).await
    }

    pub async fn complete(&self, course_id: &str) -> CourseResult<Option<CourseRead>> {
        self.transition("complete", course_id).await
    }

    pub async fn clear_enrollments(&self, course_id: &str) -> CourseResult<()> {
        let _: Option<Value> = self.transition("clear-enrollments", course_id).await?;
        Ok(())
    }

    pub async fn upload_banner(&self, course_id: &str, file: Upload) -> CourseResult<CourseRead> {
        let req = ApiRequest::patch(format!("{BASE}/banner"))
            .query("course_id", course_id)
            .form(file.attach(FormData::new(), "file"))
            .auth();
        fetch_one(&self.client, &req, "course").await
    }

    pub async fn request_draft_review(&self, request: &DraftRequest) -> CourseResult<Option<CourseDraft>> {
        let req = ApiRequest::post(format!("{BASE}/draft/request"))
            .json(request)?
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn pending_drafts(&self, page: u32, page_size: u32) -> CourseResult<Vec<CourseDraft>> {
        let req = ApiRequest::get(format!("{BASE}/draft/pending"))
            .query("page", page)
            .query("page_size", page_size)
            .auth();
        fetch_items(&self.client, &req).await
    }

    pub async fn drafts_by_course(&self, course_id: &str) -> CourseResult<Vec<CourseDraft>> {
        let req = ApiRequest::get(format!("{BASE}/draft/by-course"))
            .query("course_id", course_id)
            .auth();
        fetch_items(&self.client, &req).await
    }

    async fn transition<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        course_id: &str,
    ) -> CourseResult<Option<T>> {
        let req = ApiRequest::patch(format!("{BASE}/{action}"))
            .query("course_id", course_id)
            .empty_json()
            .auth();
        let result = fetch_first(&self.client, &req).await;
        if result.is_ok() {
            info!(course_id, action, "Course transition accepted");
        }
        result
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(status: &str) -> CourseRead {
        serde_json::from_value(json!({
            "course_id": "c1",
            "course_name": "Algebra",
            "teacher_id": "t1",
            "course_price": 149.5,
            "course_status": status
        }))
        .unwrap()
    }

    #[test]
    fn test_status_predicates() {
        assert!(course("DRAFT").is_editable());
        assert!(!course("PUBLISHED").is_editable());
        assert!(course("PUBLISHED").can_start());
        assert!(course("ONGOING").is_schedulable());
        assert!(!course("COMPLETED").is_schedulable());
        assert!(!course("CANCELLED").can_start());
    }

    #[test]
    fn test_numeric_price_becomes_string() {
        assert_eq!(course("DRAFT").course_price, "149.5");
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = CourseUpdateRequest {
            course_name: Some("Geometry".into()),
            capacity: Some(12),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"course_name": "Geometry", "capacity": 12})
        );
        assert!(CourseUpdateRequest::default().is_empty());
    }
}
