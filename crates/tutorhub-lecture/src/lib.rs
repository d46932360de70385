//! Live lecture support for the tutorhub teacher client
//!
//! [`LectureController`] polls a course's lesson status and runs the join
//! flow (create lesson, obtain token, verify). [`LectureSession`] takes the
//! resulting [`JoinTicket`] into the video session through the
//! [`VideoClient`] seam, keeps a heartbeat going and leaves exactly once.

pub mod api;
pub mod controller;
pub mod error;
pub mod models;
pub mod session;
pub mod video;

pub use api::{LectureRoutes, LiveLectureApi, DEFAULT_LESSON_DESCRIPTION};
pub use controller::{LectureController, LectureState};
pub use error::{LectureError, LectureResult, VideoError};
pub use models::{JoinTicket, JoinToken, Lesson, LessonStatus, StatusSnapshot};
pub use session::{ExitTrigger, LectureSession, SessionOptions};
pub use video::{ConnectionState, MediaStream, VideoClient, VideoHandle, VideoQuality, VideoResult};
