// Command handlers for the tutorhub CLI

pub mod announcements;
pub mod auth;
pub mod courses;
pub mod lecture;
pub mod schedule;

pub use announcements::AnnouncementsCommand;
pub use auth::{LoginCommand, LogoutCommand, Prompt, ScriptedPrompt, StdinPrompt, WhoamiCommand};
pub use courses::{CourseShowCommand, CoursesListCommand};
pub use lecture::{LectureJoinCommand, LectureStatusCommand};
pub use schedule::ScheduleAddCommand;

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::CliResult;

/// Trait for command handlers
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self, ctx: &AppContext) -> CliResult<()>;
}
