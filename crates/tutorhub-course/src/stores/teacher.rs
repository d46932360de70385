//! A teacher's course list grouped by lifecycle stage

use parking_lot::RwLock;
use tracing::{debug, warn};
use tutorhub_http::ApiClient;

use crate::course::{CourseApi, CourseRead, CourseStatus};
use crate::error::{CourseError, CourseResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherCoursesState {
    pub courses: Vec<CourseRead>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Courses owned by one teacher
///
/// Start, cancel and complete are only sent when the course is in the
/// stage that allows them; the list is reloaded after each.
pub struct TeacherCourses {
    api: CourseApi,
    teacher_id: String,
    state: RwLock<TeacherCoursesState>,
}

impl TeacherCourses {
    pub fn new(client: ApiClient, teacher_id: impl Into<String>) -> Self {
        Self {
            api: CourseApi::new(client),
            teacher_id: teacher_id.into(),
            state: RwLock::new(TeacherCoursesState::default()),
        }
    }

    pub fn teacher_id(&self) -> &str {
        &self.teacher_id
    }

    pub fn state(&self) -> TeacherCoursesState {
        self.state.read().clone()
    }

    pub async fn refresh(&self) -> CourseResult<()> {
        self.state.write().loading = true;
        let result = self.api.by_teacher(&self.teacher_id).await;

        let mut state = self.state.write();
        state.loading = false;
        match result {
            Ok(courses) => {
                debug!(teacher_id = %self.teacher_id, count = courses.len(), "Courses loaded");
                state.courses = courses;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(teacher_id = %self.teacher_id, "Course list failed: {}", e);
                state.error = Some(e.message());
                Err(e)
            }
        }
    }

    pub fn all(&self) -> Vec<CourseRead> {
        self.state.read().courses.clone()
    }

    pub fn find(&self, course_id: &str) -> Option<CourseRead> {
        self.filter(|c| c.course_id == course_id).into_iter().next()
    }

    /// Visible to students: enrolling or running
    pub fn published(&self) -> Vec<CourseRead> {
        self.filter(|c| {
            matches!(c.course_status, CourseStatus::Published | CourseStatus::Ongoing)
        })
    }

    pub fn enrolling(&self) -> Vec<CourseRead> {
        self.with_status(CourseStatus::Published)
    }

    pub fn ongoing(&self) -> Vec<CourseRead> {
        self.with_status(CourseStatus::Ongoing)
    }

    pub fn drafts(&self) -> Vec<CourseRead> {
        self.with_status(CourseStatus::Draft)
    }

    /// Drafts plus finished or cancelled courses
    pub fn unpublished(&self) -> Vec<CourseRead> {
        self.filter(|c| {
            matches!(
                c.course_status,
                CourseStatus::Draft | CourseStatus::Cancelled | CourseStatus::Completed
            )
        })
    }

    /// Close enrollment and start teaching
    pub async fn start(&self, course_id: &str) -> CourseResult<()> {
        self.require(course_id, CourseStatus::Published)?;
        self.record(self.api.start(course_id).await)?;
        self.refresh().await
    }

    pub async fn cancel(&self, course_id: &str) -> CourseResult<()> {
        self.require(course_id, CourseStatus::Published)?;
        self.record(self.api.cancel(course_id).await)?;
        self.refresh().await
    }

    pub async fn complete(&self, course_id: &str) -> CourseResult<()> {
        self.require(course_id, CourseStatus::Ongoing)?;
        self.record(self.api.complete(course_id).await)?;
        self.refresh().await
    }

    fn require(&self, course_id: &str, expected: CourseStatus) -> CourseResult<()> {
        let course = self
            .find(course_id)
            .ok_or_else(|| CourseError::NotFound(format!("course {course_id}")))?;
        if course.course_status != expected {
            return Err(CourseError::invalid(format!(
                "course is {}, expected {}",
                course.course_status, expected
            )));
        }
        Ok(())
    }

    fn with_status(&self, status: CourseStatus) -> Vec<CourseRead> {
        self.filter(|c| c.course_status == status)
    }

    fn filter(&self, keep: impl Fn(&CourseRead) -> bool) -> Vec<CourseRead> {
        self.state
            .read()
            .courses
            .iter()
            .filter(|c| keep(c))
            .cloned()
            .collect()
    }

    fn record<T>(&self, result: CourseResult<T>) -> CourseResult<T> {
        if let Err(e) = &result {
            warn!(teacher_id = %self.teacher_id, "Course action failed: {}", e);
            self.state.write().error = Some(e.message());
        }
        result
    }
}
