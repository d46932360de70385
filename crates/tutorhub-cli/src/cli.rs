// Argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tutorhub - manage your courses and live lectures from the terminal
#[derive(Parser, Debug)]
#[command(name = "tutorhub")]
#[command(bin_name = "tutorhub")]
#[command(about = "Teacher client for the tutorhub tutoring platform")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: <config_dir>/tutorhub/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Sign in with phone number, password and one-time code
    Login {
        /// Phone number used as the account identifier
        #[arg(long)]
        phone: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Work with your courses
    Courses {
        #[command(subcommand)]
        action: CoursesAction,
    },

    /// Work with a single course
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Edit weekly schedules
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// List a course's announcements
    Announcements {
        /// Course id
        #[arg(value_name = "COURSE")]
        course: String,

        /// Page to fetch, starting at 0
        #[arg(long)]
        page: Option<u32>,

        /// Announcements per page
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Live lecture status and joining
    Lecture {
        #[command(subcommand)]
        action: LectureAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CoursesAction {
    /// List every course you teach, grouped by status
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CourseAction {
    /// Show a course with its syllabus and schedule
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ScheduleAction {
    /// Add a weekly time block to a course
    Add {
        #[arg(value_name = "COURSE")]
        course: String,

        /// Day of week, 1 (Monday) to 7 (Sunday)
        #[arg(value_name = "DAY")]
        day: u8,

        /// Start time, HH:MM
        #[arg(value_name = "START")]
        start: String,

        /// End time, HH:MM
        #[arg(value_name = "END")]
        end: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LectureAction {
    /// Show whether a lesson can be entered right now
    Status {
        #[arg(value_name = "COURSE")]
        course: String,
    },

    /// Open the lesson and print a verified join ticket
    Join {
        #[arg(value_name = "COURSE")]
        course: String,
    },
}
