//! Lesson status and join DTOs

use serde::{Deserialize, Serialize};

/// Live state of a course's lesson slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    NoActiveLesson,
    ActiveLesson,
    CreatableWindow,
}

impl LessonStatus {
    /// A teacher may create or enter a lesson in this state
    pub fn can_enter(self) -> bool {
        matches!(self, LessonStatus::ActiveLesson | LessonStatus::CreatableWindow)
    }
}

/// Result of `status`: the state plus the lesson id used as video topic
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub status: Option<LessonStatus>,
    pub lesson_id: Option<String>,
}

/// Lesson record returned by `create`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub lesson_id: String,
    pub course_id: String,
    #[serde(default)]
    pub host_id: String,
    #[serde(default)]
    pub host_joined: bool,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct JoinToken {
    #[serde(default)]
    pub token: String,
}

/// Everything the lecture view needs to join the video session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTicket {
    pub course_id: String,
    /// Lesson id, doubles as the video session topic
    pub lesson_id: String,
    pub token: String,
}
