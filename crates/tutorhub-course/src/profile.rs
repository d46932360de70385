//! Teacher profile, overview, reviews and approval requests
//!
//! The profile service answers in PascalCase (`ID`, `Name`, `Statu`, ...).
//! The types here map those keys onto snake_case fields so callers never
//! see the wire spelling.

use serde::{Deserialize, Serialize};
use tracing::info;
use tutorhub_http::{ApiClient, ApiRequest, FormData};

use crate::error::CourseResult;
use crate::rest::{fetch_items, fetch_one, nullable_vec, segment};
use crate::upload::Upload;

const BASE: &str = "/api/course";

/// A person's profile as embedded in other records
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonProfile {
    #[serde(rename = "ID", alias = "user_id", default)]
    pub id: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Surname", alias = "surname", default)]
    pub surname: Option<String>,
    #[serde(rename = "Birthdate", alias = "birth_date", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "AvatarLink", alias = "avatar_link", default)]
    pub avatar_link: Option<String>,
    #[serde(rename = "Statu", alias = "status", default)]
    pub status: Option<String>,
}

impl PersonProfile {
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        parts.join(" ")
    }
}

/// The signed-in teacher's own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileInfo {
    #[serde(rename = "ID")]
    pub teacher_id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Surname", default)]
    pub surname: Option<String>,
    #[serde(rename = "Birthdate", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "AvatarLink", default)]
    pub avatar_link: Option<String>,
    #[serde(rename = "Statu", default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeacherSubbranch {
    /// Sent as `ID` by some endpoints and `id` by others
    #[serde(rename = "ID", alias = "id", alias = "branch_id", default)]
    pub branch_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeacherOverview {
    #[serde(rename = "ID", alias = "user_id", default)]
    pub user_id: String,
    #[serde(rename = "Profile", default)]
    pub profile: Option<PersonProfile>,
    #[serde(rename = "Subbranches", default, deserialize_with = "nullable_vec")]
    pub subbranches: Vec<TeacherSubbranch>,
    #[serde(rename = "First_Teaching_Year", default)]
    pub first_teaching_year: Option<i32>,
    #[serde(rename = "Avg_score", default)]
    pub avg_score: Option<f64>,
    #[serde(rename = "Review_count", default)]
    pub review_count: Option<i64>,
    #[serde(rename = "Statu", default)]
    pub status: Option<String>,
    #[serde(rename = "Primary_Branch", default)]
    pub primary_branch: Option<String>,
    #[serde(rename = "Biography", default)]
    pub biography: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeacherReview {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Reviewer_ID", default)]
    pub reviewer_id: Option<String>,
    #[serde(rename = "Reviewer_Name", default)]
    pub reviewer_name: Option<String>,
    #[serde(rename = "Reviewer_Surname", default)]
    pub reviewer_surname: Option<String>,
    #[serde(rename = "Score", default)]
    pub score: Option<f64>,
    #[serde(rename = "Review", default)]
    pub review: Option<String>,
    #[serde(rename = "Is_Anonymous", default)]
    pub is_anonymous: Option<bool>,
    #[serde(rename = "Moderation_Status", default)]
    pub moderation_status: Option<String>,
    #[serde(rename = "Published_At", default)]
    pub published_at: Option<String>,
    #[serde(rename = "Created_At", default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeacherReviews {
    #[serde(rename = "Total_Reviews", default)]
    pub total_reviews: i64,
    #[serde(rename = "Review_Score", default)]
    pub review_score: Option<f64>,
    #[serde(rename = "Reviews", default, deserialize_with = "nullable_vec")]
    pub reviews: Vec<TeacherReview>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeacherApproval {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Teacher_ID")]
    pub teacher_id: String,
    #[serde(rename = "Statu")]
    pub status: ApprovalStatus,
    #[serde(rename = "Applicant_Comment", default)]
    pub applicant_comment: Option<String>,
    #[serde(rename = "Reviewer_ID", default)]
    pub reviewer_id: Option<String>,
    #[serde(rename = "Decided_At", default)]
    pub decided_at: Option<String>,
    #[serde(rename = "Created_At", default)]
    pub created_at: String,
    #[serde(rename = "Updated_At", default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeacherUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_teaching_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_branch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubbranchChange {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub removed: Vec<String>,
}

/// Profile and teacher endpoints
#[derive(Debug, Clone)]
pub struct ProfileApi {
    client: ApiClient,
}

impl ProfileApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self, profile_id: &str) -> CourseResult<ProfileInfo> {
        let req = ApiRequest::get(format!("{BASE}/profile"))
            .query("profile_id", profile_id)
            .auth();
        fetch_one(&self.client, &req, "profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> CourseResult<ProfileInfo> {
        let req = ApiRequest::patch(format!("{BASE}/profile/update"))
            .json(update)?
            .auth();
        fetch_one(&self.client, &req, "profile").await
    }

    pub async fn update_picture(&self, file: Upload) -> CourseResult<ProfileInfo> {
        let req = ApiRequest::patch(format!("{BASE}/profile/picture"))
            .form(file.attach(FormData::new(), "file"))
            .auth();
        let profile: ProfileInfo = fetch_one(&self.client, &req, "profile").await?;
        info!(teacher_id = %profile.teacher_id, "Profile picture updated");
        Ok(profile)
    }

    pub async fn overview(&self, teacher_id: &str) -> CourseResult<TeacherOverview> {
        let req = ApiRequest::get(format!("{BASE}/teacher/overview"))
            .query("teacher_id", teacher_id)
            .auth();
        fetch_one(&self.client, &req, "teacher overview").await
    }

    pub async fn update_teacher(&self, update: &TeacherUpdate) -> CourseResult<TeacherOverview> {
        let req = ApiRequest::patch(format!("{BASE}/teacher/update"))
            .json(update)?
            .auth();
        fetch_one(&self.client, &req, "teacher overview").await
    }

    pub async fn change_subbranches(&self, change: &SubbranchChange) -> CourseResult<TeacherOverview> {
        let req = ApiRequest::patch(format!("{BASE}/teacher/subbranches/change"))
            .json(change)?
            .auth();
        fetch_one(&self.client, &req, "teacher overview").await
    }

    pub async fn reviews(&self, teacher_id: &str, page: u32) -> CourseResult<TeacherReviews> {
        let req = ApiRequest::get(format!("{BASE}/teacher/reviews"))
            .query("teacher_id", teacher_id)
            .query("page", page)
            .auth();
        fetch_one(&self.client, &req, "teacher reviews").await
    }

    pub async fn request_approval(&self, applicant_comment: &str) -> CourseResult<TeacherOverview> {
        let req = ApiRequest::post(format!("{BASE}/teacher/approval/request"))
            .json(&serde_json::json!({ "applicant_comment": applicant_comment }))?
            .auth();
        fetch_one(&self.client, &req, "teacher overview").await
    }

    pub async fn approvals(&self, teacher_id: &str) -> CourseResult<Vec<TeacherApproval>> {
        let req =
            ApiRequest::get(format!("{BASE}/teacher/approvals/{}", segment(teacher_id))).auth();
        fetch_items(&self.client, &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_maps_pascal_case() {
        let profile: ProfileInfo = serde_json::from_value(json!({
            "ID": "t1", "Name": "Ada", "Surname": null, "Birthdate": "1990-01-01", "Statu": "ACTIVE"
        }))
        .unwrap();
        assert_eq!(profile.teacher_id, "t1");
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert!(profile.surname.is_none());
        assert!(profile.avatar_link.is_none());
        assert_eq!(profile.status.as_deref(), Some("ACTIVE"));
    }

    #[test]
    fn test_subbranch_accepts_both_id_spellings() {
        let overview: TeacherOverview = serde_json::from_value(json!({
            "ID": "t1",
            "Subbranches": [{"ID": "s1", "name": "Algebra"}, {"id": "s2", "name": "Geometry"}],
            "Primary_Branch": "MATEMATIK"
        }))
        .unwrap();
        let ids: Vec<&str> = overview.subbranches.iter().map(|s| s.branch_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[test]
    fn test_null_subbranches_become_empty() {
        let overview: TeacherOverview =
            serde_json::from_value(json!({"ID": "t1", "Subbranches": null})).unwrap();
        assert!(overview.subbranches.is_empty());
        assert!(overview.profile.is_none());
    }

    #[test]
    fn test_display_name_skips_blanks() {
        let person = PersonProfile {
            name: Some("Ada".into()),
            surname: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(person.display_name(), "Ada");
    }

    #[test]
    fn test_subbranch_change_omits_empty_lists() {
        let change = SubbranchChange {
            added: vec!["s1".into()],
            removed: vec![],
        };
        assert_eq!(serde_json::to_value(&change).unwrap(), json!({"added": ["s1"]}));
    }
}
