//! Weekly syllabus: which subunits are taught in which week, in what order

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tutorhub_http::{ApiClient, ApiRequest};

use crate::curriculum::{Intensity, Outcome};
use crate::error::{CourseError, CourseResult};
use crate::rest::fetch_first;

const BASE: &str = "/api/course/course/syllabus";

/// A subunit with its outcomes, embedded in a syllabus row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubunitTree {
    #[serde(default)]
    pub parent_unit_id: String,
    pub id: String,
    #[serde(default)]
    pub branch: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub hardness: Option<Intensity>,
    #[serde(default)]
    pub priority: Option<Intensity>,
    #[serde(default)]
    pub background_level: Option<Intensity>,
    #[serde(default)]
    pub detail: Option<Intensity>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyllabusRow {
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub subunit: Option<SubunitTree>,
    pub target_week: u32,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CourseSyllabus {
    pub course_id: String,
    #[serde(default)]
    pub items: Vec<SyllabusRow>,
}

impl CourseSyllabus {
    /// Rows grouped by week, each week ordered by `order_index`
    pub fn weeks(&self) -> BTreeMap<u32, Vec<&SyllabusRow>> {
        let mut weeks: BTreeMap<u32, Vec<&SyllabusRow>> = BTreeMap::new();
        for row in &self.items {
            weeks.entry(row.target_week).or_default().push(row);
        }
        for rows in weeks.values_mut() {
            rows.sort_by_key(|r| r.order_index);
        }
        weeks
    }

    /// Row ids of one week in display order
    pub fn week_ids(&self, week: u32) -> Vec<String> {
        self.weeks()
            .remove(&week)
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyllabusInsert {
    pub course_id: String,
    pub subunit_id: String,
    pub target_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyllabusRemove {
    pub course_id: String,
    pub syllabus_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyllabusOrderWeek {
    pub course_id: String,
    pub target_week: u32,
    pub ordered_syllabus_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyllabusMove {
    pub course_id: String,
    pub syllabus_id: String,
    pub new_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_order_index: Option<i32>,
}

fn check_week(week: u32) -> CourseResult<()> {
    if week < 1 {
        return Err(CourseError::invalid("week must be 1 or greater"));
    }
    Ok(())
}

/// Syllabus endpoints; every mutation answers with the whole syllabus
#[derive(Debug, Clone)]
pub struct SyllabusApi {
    client: ApiClient,
}

impl SyllabusApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, course_id: &str) -> CourseResult<Option<CourseSyllabus>> {
        let req = ApiRequest::get(BASE).query("course_id", course_id).auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn insert(&self, request: &SyllabusInsert) -> CourseResult<Option<CourseSyllabus>> {
        check_week(request.target_week)?;
        let req = ApiRequest::post(format!("{BASE}/insert")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn remove(&self, request: &SyllabusRemove) -> CourseResult<Option<CourseSyllabus>> {
        let req = ApiRequest::delete(format!("{BASE}/remove")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn order_week(&self, request: &SyllabusOrderWeek) -> CourseResult<Option<CourseSyllabus>> {
        check_week(request.target_week)?;
        let req = ApiRequest::patch(format!("{BASE}/order-week")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn move_item(&self, request: &SyllabusMove) -> CourseResult<Option<CourseSyllabus>> {
        check_week(request.new_week)?;
        let req = ApiRequest::patch(format!("{BASE}/move")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }
}
