// Command routing and dispatch

use clap::Parser;

use crate::cli::{Cli, Commands, CourseAction, CoursesAction, LectureAction, ScheduleAction};
use crate::commands::*;
use crate::context::AppContext;
use crate::error::CliResult;

pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();
        crate::logging::init_logging(cli.verbose);

        let ctx = AppContext::load(cli.config.clone())?;
        Self::execute(&cli.command, &ctx).await
    }

    /// Build the handler for a parsed command
    pub fn handler(command: &Commands) -> Box<dyn Command> {
        match command {
            Commands::Login { phone } => Box::new(LoginCommand::new(phone.clone())),
            Commands::Logout => Box::new(LogoutCommand),
            Commands::Whoami => Box::new(WhoamiCommand),
            Commands::Courses {
                action: CoursesAction::List,
            } => Box::new(CoursesListCommand),
            Commands::Course {
                action: CourseAction::Show { id },
            } => Box::new(CourseShowCommand::new(id.clone())),
            Commands::Schedule {
                action:
                    ScheduleAction::Add {
                        course,
                        day,
                        start,
                        end,
                    },
            } => Box::new(ScheduleAddCommand::new(
                course.clone(),
                *day,
                start.clone(),
                end.clone(),
            )),
            Commands::Announcements {
                course,
                page,
                page_size,
            } => Box::new(AnnouncementsCommand::new(course.clone()).with_page(*page, *page_size)),
            Commands::Lecture {
                action: LectureAction::Status { course },
            } => Box::new(LectureStatusCommand::new(course.clone())),
            Commands::Lecture {
                action: LectureAction::Join { course },
            } => Box::new(LectureJoinCommand::new(course.clone())),
        }
    }

    /// Execute a command
    pub async fn execute(command: &Commands, ctx: &AppContext) -> CliResult<()> {
        Self::handler(command).execute(ctx).await
    }
}
