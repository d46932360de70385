//! Course documents and homework answer keys

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use tutorhub_http::{ApiClient, ApiRequest, FormData};

use crate::error::{CourseError, CourseResult};
use crate::profile::PersonProfile;
use crate::rest::{fetch, fetch_first, fetch_items};
use crate::upload::Upload;

const BASE: &str = "/api/course/course";

pub const DEFAULT_DOCUMENT_PAGE_SIZE: u32 = 20;

/// Valid letters in a homework answer key
const ANSWER_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E'];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Homework,
    Summary,
    LectureNotes,
    Reading,
    Solution,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Homework => "HOMEWORK",
            DocumentType::Summary => "SUMMARY",
            DocumentType::LectureNotes => "LECTURE_NOTES",
            DocumentType::Reading => "READING",
            DocumentType::Solution => "SOLUTION",
            DocumentType::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseDocument {
    /// Row id, unique per course
    pub id: String,
    /// Shared id of the file across every course it was published to
    pub document_id: String,
    pub course_id: String,
    #[serde(default)]
    pub uploader_profile: Option<Value>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub file_size_bytes: u64,
    pub document_type: DocumentType,
    /// Whether an answer key exists; only meaningful for homework
    #[serde(default)]
    pub homework_answers: Option<bool>,
    pub document_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub visible_from: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub document_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Homework {
    pub document: CourseDocument,
    pub question_count: u32,
    #[serde(default)]
    pub answers: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Profile", default)]
    pub profile: Option<PersonProfile>,
    #[serde(rename = "School_Level", default)]
    pub school_level: Option<String>,
    #[serde(rename = "Target_Ranking", default)]
    pub target_ranking: Option<String>,
    #[serde(rename = "Province", default)]
    pub province: Option<Value>,
    #[serde(rename = "District", default)]
    pub district: Option<Value>,
    #[serde(rename = "School", default)]
    pub school: Option<Value>,
}

/// One student's state for one homework
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentStatus {
    pub document_id: String,
    pub question_count: u32,
    #[serde(default)]
    pub real_answers: String,
    #[serde(default)]
    pub is_submitted: bool,
    #[serde(default)]
    pub student_answers: Option<String>,
    #[serde(default)]
    pub correct_count: Option<u32>,
    #[serde(default)]
    pub wrong_count: Option<u32>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentHomeworkAssignment {
    pub student: StudentInfo,
    pub assignment: AssignmentStatus,
}

/// New document published to one or more courses
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCreate {
    pub course_ids: Vec<String>,
    pub document_type: DocumentType,
    pub document_name: String,
    pub description: Option<String>,
    pub week: Option<u32>,
    pub visible_from: Option<String>,
    pub deadline: Option<String>,
    pub file: Upload,
}

impl DocumentCreate {
    pub fn validate(&self) -> CourseResult<()> {
        if self.course_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(CourseError::invalid("at least one course is required"));
        }
        if self.document_name.trim().is_empty() {
            return Err(CourseError::invalid("document name must not be blank"));
        }
        Ok(())
    }

    fn into_form(self) -> FormData {
        let mut form = FormData::new();
        for id in self.course_ids.iter().filter(|id| !id.trim().is_empty()) {
            form = form.text("course_ids", id.as_str());
        }
        let form = form
            .text("document_type", self.document_type.as_str())
            .text("document_name", self.document_name)
            .text_opt("description", self.description)
            .text_opt("week", self.week.map(|w| w.to_string()))
            .text_opt("visible_from", self.visible_from)
            .text_opt("deadline", self.deadline);
        self.file.attach(form, "file")
    }
}

/// Identifies a document by row id or by shared document id, never both
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSelector {
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl DocumentSelector {
    pub fn by_id(course_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            id: Some(id.into()),
            document_id: None,
        }
    }

    pub fn by_document_id(course_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            id: None,
            document_id: Some(document_id.into()),
        }
    }

    pub fn validate(&self) -> CourseResult<()> {
        check_selector(self.id.as_deref(), self.document_id.as_deref())
    }
}

fn check_selector(id: Option<&str>, document_id: Option<&str>) -> CourseResult<()> {
    let present = |v: Option<&str>| v.map_or(false, |s| !s.trim().is_empty());
    if present(id) == present(document_id) {
        return Err(CourseError::invalid(
            "exactly one of id or document_id must be given",
        ));
    }
    Ok(())
}

/// Metadata change for an existing document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentUpdate {
    /// Sent as a query parameter, not in the body
    #[serde(skip)]
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl DocumentUpdate {
    pub fn validate(&self) -> CourseResult<()> {
        check_selector(self.id.as_deref(), self.document_id.as_deref())?;
        let has_change = self.document_name.is_some()
            || self.description.is_some()
            || self.document_type.is_some()
            || self.week.is_some()
            || self.visible_from.is_some()
            || self.deadline.is_some();
        if !has_change {
            return Err(CourseError::invalid("nothing to update"));
        }
        if self.document_name.as_deref().map_or(false, |n| n.trim().is_empty()) {
            return Err(CourseError::invalid("document name must not be blank"));
        }
        Ok(())
    }
}

/// Answer key for a homework: one letter A-E per question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HomeworkUpsert {
    pub course_id: String,
    pub document_id: String,
    pub question_count: u32,
    pub answers: String,
}

impl HomeworkUpsert {
    /// Build an upsert; answers are upper-cased and whitespace is dropped
    pub fn new(
        course_id: impl Into<String>,
        document_id: impl Into<String>,
        answers: &str,
    ) -> Self {
        let answers: String = answers
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self {
            course_id: course_id.into(),
            document_id: document_id.into(),
            question_count: answers.chars().count() as u32,
            answers,
        }
    }

    pub fn validate(&self) -> CourseResult<()> {
        if self.question_count == 0 {
            return Err(CourseError::invalid("question count must be positive"));
        }
        if self.answers.chars().count() != self.question_count as usize {
            return Err(CourseError::invalid(format!(
                "expected {} answers, got {}",
                self.question_count,
                self.answers.chars().count()
            )));
        }
        if let Some(bad) = self.answers.chars().find(|c| !ANSWER_LETTERS.contains(c)) {
            return Err(CourseError::invalid(format!(
                "'{bad}' is not a valid answer (use A-E)"
            )));
        }
        Ok(())
    }
}

/// Documents and homework endpoints
#[derive(Debug, Clone)]
pub struct MaterialsApi {
    client: ApiClient,
}

impl MaterialsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn documents(
        &self,
        course_id: &str,
        page: u32,
        page_size: u32,
    ) -> CourseResult<Vec<CourseDocument>> {
        let req = ApiRequest::get(format!("{BASE}/documents"))
            .query("course_id", course_id)
            .query("page", page)
            .query("page_size", page_size)
            .auth();
        fetch_items(&self.client, &req).await
    }

    pub async fn documents_by_week(&self, course_id: &str, week: u32) -> CourseResult<Vec<CourseDocument>> {
        let req = ApiRequest::get(format!("{BASE}/documents/by-week"))
            .query("course_id", course_id)
            .query("week", week)
            .auth();
        fetch_items(&self.client, &req).await
    }

    pub async fn homework(&self, document_id: &str) -> CourseResult<Option<Homework>> {
        let req = ApiRequest::get(format!("{BASE}/homework"))
            .query("document_id", document_id)
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn homework_submissions(
        &self,
        course_id: &str,
        document_id: &str,
        page: u32,
        page_size: u32,
    ) -> CourseResult<Vec<StudentHomeworkAssignment>> {
        let req = ApiRequest::get(format!("{BASE}/documents/homework/submissions"))
            .query("course_id", course_id)
            .query("document_id", document_id)
            .query("page", page)
            .query("page_size", page_size)
            .auth();
        fetch_items(&self.client, &req).await
    }

    /// Upload a document; one row comes back per target course
    pub async fn create_document(&self, document: DocumentCreate) -> CourseResult<Vec<CourseDocument>> {
        document.validate()?;
        let req = ApiRequest::post(format!("{BASE}/documents/create"))
            .form(document.into_form())
            .auth();
        let created: Vec<CourseDocument> = fetch_items(&self.client, &req).await?;
        info!(rows = created.len(), "Document uploaded");
        Ok(created)
    }

    pub async fn delete_document(&self, selector: &DocumentSelector) -> CourseResult<()> {
        selector.validate()?;
        let req = ApiRequest::delete(format!("{BASE}/documents"))
            .json(selector)?
            .auth();
        fetch::<Value>(&self.client, &req).await?;
        Ok(())
    }

    pub async fn update_document(&self, update: &DocumentUpdate) -> CourseResult<Option<CourseDocument>> {
        update.validate()?;
        let req = ApiRequest::patch(format!("{BASE}/documents/update"))
            .query("course_id", &update.course_id)
            .json(update)?
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn replace_document_file(
        &self,
        course_id: &str,
        document_id: &str,
        file: Upload,
    ) -> CourseResult<Option<CourseDocument>> {
        let req = ApiRequest::patch(format!("{BASE}/documents/update-file"))
            .query("course_id", course_id)
            .query("document_id", document_id)
            .form(file.attach(FormData::new(), "file"))
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn upsert_homework(&self, upsert: &HomeworkUpsert) -> CourseResult<Option<Homework>> {
        upsert.validate()?;
        let req = ApiRequest::post(format!("{BASE}/documents/homeworks/upsert"))
            .json(upsert)?
            .auth();
        fetch_first(&self.client, &req).await
    }
}
