//! lecture status / lecture join

use async_trait::async_trait;
use tutorhub_lecture::{LectureController, LectureRoutes, LessonStatus, LiveLectureApi};

use crate::commands::Command;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputStyle};

fn controller(ctx: &AppContext, course_id: &str) -> CliResult<LectureController> {
    let routes = LectureRoutes::from_settings(&ctx.config().lecture);
    let api = LiveLectureApi::new(ctx.authorized()?, routes);
    Ok(LectureController::new(api, course_id))
}

pub fn status_label(status: Option<LessonStatus>) -> &'static str {
    match status {
        Some(LessonStatus::ActiveLesson) => "lesson in progress",
        Some(LessonStatus::CreatableWindow) => "lesson can be opened",
        Some(LessonStatus::NoActiveLesson) => "no lesson right now",
        None => "unknown",
    }
}

pub struct LectureStatusCommand {
    course_id: String,
}

impl LectureStatusCommand {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
        }
    }
}

#[async_trait]
impl Command for LectureStatusCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let controller = controller(ctx, &self.course_id)?;
        let snapshot = controller.api().status(&self.course_id).await?;

        let style = OutputStyle::default();
        println!("{}", style.key_value("status", status_label(snapshot.status)));
        if let Some(lesson_id) = &snapshot.lesson_id {
            println!("{}", style.key_value("lesson", &style.code(lesson_id)));
        }
        let enterable = snapshot.status.map(LessonStatus::can_enter).unwrap_or(false);
        println!(
            "{}",
            style.key_value("can enter", if enterable { "yes" } else { "no" })
        );
        Ok(())
    }
}

pub struct LectureJoinCommand {
    course_id: String,
}

impl LectureJoinCommand {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
        }
    }
}

#[async_trait]
impl Command for LectureJoinCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let controller = controller(ctx, &self.course_id)?;
        controller.refresh_status().await;

        let state = controller.state();
        if let Some(error) = &state.error {
            return Err(CliError::LectureUnavailable(error.clone()));
        }
        if !state.can_enter() {
            return Err(CliError::LectureUnavailable(
                status_label(state.status).to_string(),
            ));
        }

        let ticket = controller
            .begin_join_flow()
            .await?
            .ok_or_else(|| CliError::LectureUnavailable(status_label(state.status).to_string()))?;

        output::print_success("Join ticket verified");
        let style = OutputStyle::default();
        println!("{}", style.key_value("course", &ticket.course_id));
        println!("{}", style.key_value("lesson", &style.code(&ticket.lesson_id)));
        println!("{}", style.key_value("token", &style.code(&ticket.token)));
        Ok(())
    }
}
