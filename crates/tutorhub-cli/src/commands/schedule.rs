//! schedule add

use async_trait::async_trait;
use tracing::debug;
use tutorhub_course::CourseStore;

use crate::commands::courses::schedule_lines;
use crate::commands::Command;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::output::{self, OutputStyle};

pub struct ScheduleAddCommand {
    course_id: String,
    day: u8,
    start: String,
    end: String,
}

impl ScheduleAddCommand {
    pub fn new(
        course_id: impl Into<String>,
        day: u8,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            day,
            start: start.into(),
            end: end.into(),
        }
    }
}

#[async_trait]
impl Command for ScheduleAddCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let store = CourseStore::new(ctx.authorized()?, self.course_id.clone());
        debug!(course_id = %self.course_id, day = self.day, "Adding schedule block");
        store.insert_block(self.day, &self.start, &self.end).await?;

        output::print_success(&format!(
            "Added {}-{} on day {}",
            self.start, self.end, self.day
        ));
        if let Some(schedule) = store.schedule() {
            let style = OutputStyle::default();
            for line in schedule_lines(&schedule) {
                println!("  {}", style.dim(&line));
            }
        }
        Ok(())
    }
}
