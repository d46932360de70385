//! State for the course editor: the course, its syllabus and its schedule

use parking_lot::RwLock;
use tracing::warn;
use tutorhub_http::ApiClient;

use crate::course::{CourseApi, CourseRead, CourseStatus, CourseUpdateRequest, DraftRequest};
use crate::error::CourseResult;
use crate::schedule::{ScheduleApi, ScheduleClear, ScheduleInsert, ScheduleRemove, ScheduleUpdate, WeeklyBusyMap};
use crate::syllabus::{CourseSyllabus, SyllabusApi, SyllabusInsert, SyllabusMove, SyllabusOrderWeek, SyllabusRemove};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseState {
    pub course: Option<CourseRead>,
    pub syllabus: Option<CourseSyllabus>,
    pub schedule: Option<WeeklyBusyMap>,
    pub loading: bool,
    /// Display message of the last failure
    pub error: Option<String>,
}

/// One course's editor state
///
/// Every mutation is followed by a refetch of the part it touched. Failures
/// are kept in [`CourseState::error`] as display text and also returned.
pub struct CourseStore {
    course_id: String,
    courses: CourseApi,
    syllabus: SyllabusApi,
    schedule: ScheduleApi,
    state: RwLock<CourseState>,
}

impl CourseStore {
    pub fn new(client: ApiClient, course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            courses: CourseApi::new(client.clone()),
            syllabus: SyllabusApi::new(client.clone()),
            schedule: ScheduleApi::new(client),
            state: RwLock::new(CourseState::default()),
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn state(&self) -> CourseState {
        self.state.read().clone()
    }

    pub fn course(&self) -> Option<CourseRead> {
        self.state.read().course.clone()
    }

    pub fn syllabus(&self) -> Option<CourseSyllabus> {
        self.state.read().syllabus.clone()
    }

    pub fn schedule(&self) -> Option<WeeklyBusyMap> {
        self.state.read().schedule.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Load course, syllabus and schedule; returns the first failure
    pub async fn load(&self) -> CourseResult<()> {
        self.state.write().loading = true;
        let course = self.refresh_course().await;
        let syllabus = self.refresh_syllabus().await;
        let schedule = self.refresh_schedule().await;
        self.state.write().loading = false;
        course.and(syllabus).and(schedule)
    }

    pub async fn refresh_course(&self) -> CourseResult<()> {
        let course = self.record(self.courses.item(&self.course_id, true).await)?;
        let mut state = self.state.write();
        state.course = course;
        state.error = None;
        Ok(())
    }

    pub async fn refresh_syllabus(&self) -> CourseResult<()> {
        let syllabus = self.record(self.syllabus.get(&self.course_id).await)?;
        self.state.write().syllabus = syllabus;
        Ok(())
    }

    pub async fn refresh_schedule(&self) -> CourseResult<()> {
        let schedule = self.record(self.schedule.by_course(&self.course_id).await)?;
        self.state.write().schedule = schedule;
        Ok(())
    }

    // Lifecycle

    pub async fn update(&self, update: &CourseUpdateRequest) -> CourseResult<()> {
        self.record(self.courses.update(&self.course_id, update).await)?;
        self.refresh_course().await
    }

    pub async fn start(&self) -> CourseResult<()> {
        self.record(self.courses.start(&self.course_id).await)?;
        self.refresh_course().await
    }

    pub async fn cancel(&self) -> CourseResult<()> {
        self.record(self.courses.cancel(&self.course_id).await)?;
        self.refresh_course().await
    }

    pub async fn complete(&self) -> CourseResult<()> {
        self.record(self.courses.complete(&self.course_id).await)?;
        self.refresh_course().await
    }

    /// Ask for the draft to be reviewed for publication
    pub async fn request_draft(&self, comment: Option<String>) -> CourseResult<()> {
        let request = DraftRequest {
            course_id: self.course_id.clone(),
            applicant_comment: comment.filter(|c| !c.trim().is_empty()),
        };
        self.record(self.courses.request_draft_review(&request).await)?;
        self.refresh_course().await
    }

    // Syllabus

    pub async fn insert_syllabus(
        &self,
        subunit_id: &str,
        target_week: u32,
        order_index: Option<i32>,
    ) -> CourseResult<()> {
        let request = SyllabusInsert {
            course_id: self.course_id.clone(),
            subunit_id: subunit_id.to_string(),
            target_week,
            order_index,
        };
        self.record(self.syllabus.insert(&request).await)?;
        self.refresh_syllabus().await
    }

    pub async fn remove_syllabus(&self, syllabus_id: &str) -> CourseResult<()> {
        let request = SyllabusRemove {
            course_id: self.course_id.clone(),
            syllabus_id: syllabus_id.to_string(),
        };
        self.record(self.syllabus.remove(&request).await)?;
        self.refresh_syllabus().await
    }

    pub async fn reorder_week(&self, target_week: u32, ordered_ids: Vec<String>) -> CourseResult<()> {
        let request = SyllabusOrderWeek {
            course_id: self.course_id.clone(),
            target_week,
            ordered_syllabus_ids: ordered_ids,
        };
        self.record(self.syllabus.order_week(&request).await)?;
        self.refresh_syllabus().await
    }

    pub async fn move_syllabus(
        &self,
        syllabus_id: &str,
        new_week: u32,
        new_order_index: Option<i32>,
    ) -> CourseResult<()> {
        let request = SyllabusMove {
            course_id: self.course_id.clone(),
            syllabus_id: syllabus_id.to_string(),
            new_week,
            new_order_index,
        };
        self.record(self.syllabus.move_item(&request).await)?;
        self.refresh_syllabus().await
    }

    // Schedule

    pub async fn insert_block(&self, day_of_week: u8, start_time: &str, end_time: &str) -> CourseResult<()> {
        let request = ScheduleInsert {
            course_id: self.course_id.clone(),
            day_of_week,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        };
        self.record(self.schedule.insert(&request).await)?;
        self.refresh_schedule().await
    }

    pub async fn update_block(
        &self,
        schedule_id: &str,
        day_of_week: u8,
        start_time: &str,
        end_time: &str,
    ) -> CourseResult<()> {
        let request = ScheduleUpdate {
            course_id: self.course_id.clone(),
            schedule_id: schedule_id.to_string(),
            new_day_of_week: day_of_week,
            new_start_time: start_time.to_string(),
            new_end_time: end_time.to_string(),
        };
        self.record(self.schedule.update(&request).await)?;
        self.refresh_schedule().await
    }

    pub async fn remove_block(&self, schedule_id: &str) -> CourseResult<()> {
        let request = ScheduleRemove {
            course_id: self.course_id.clone(),
            schedule_id: schedule_id.to_string(),
        };
        self.record(self.schedule.remove(&request).await)?;
        self.refresh_schedule().await
    }

    pub async fn clear_schedule(&self) -> CourseResult<()> {
        let request = ScheduleClear {
            course_id: self.course_id.clone(),
        };
        self.record(self.schedule.clear(&request).await)?;
        self.refresh_schedule().await
    }

    // Derived flags

    pub fn status(&self) -> Option<CourseStatus> {
        self.state.read().course.as_ref().map(|c| c.course_status)
    }

    pub fn is_draft(&self) -> bool {
        self.status() == Some(CourseStatus::Draft)
    }

    pub fn is_published(&self) -> bool {
        self.status() == Some(CourseStatus::Published)
    }

    pub fn is_ongoing(&self) -> bool {
        self.status() == Some(CourseStatus::Ongoing)
    }

    pub fn is_completed(&self) -> bool {
        self.status() == Some(CourseStatus::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status() == Some(CourseStatus::Cancelled)
    }

    pub fn is_editable(&self) -> bool {
        self.state.read().course.as_ref().map_or(false, CourseRead::is_editable)
    }

    pub fn is_schedulable(&self) -> bool {
        self.state.read().course.as_ref().map_or(false, CourseRead::is_schedulable)
    }

    /// Store the display message of a failure and pass the result through
    fn record<T>(&self, result: CourseResult<T>) -> CourseResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(course_id = %self.course_id, "Course request failed: {}", e);
                self.state.write().error = Some(e.message());
                Err(e)
            }
        }
    }
}
