//! Stateful views over the course APIs

pub mod announcements;
pub mod course;
pub mod profile;
pub mod teacher;

pub use announcements::{AnnouncementState, AnnouncementStore, FetchOutcome};
pub use course::{CourseState, CourseStore};
pub use profile::{ProfileState, ProfileStore};
pub use teacher::{TeacherCourses, TeacherCoursesState};
