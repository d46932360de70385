//! Course management for the tutorhub teacher client
//!
//! Typed wrappers for the course backend plus the stores that hold view
//! state on top of them:
//!
//! - [`curriculum`]: the level to outcome tree and a lazy browser over it
//! - [`course`]: course records, lifecycle transitions and draft reviews
//! - [`syllabus`] and [`schedule`]: weekly plan and weekly time blocks
//! - [`materials`]: documents and homework answer keys
//! - [`announcements`] and [`profile`]
//! - [`stores`]: cached state with the last error kept for display
//!
//! Business failures the backend reports by code come back as
//! [`CourseError::Rule`] with a message ready to show.

pub mod announcements;
pub mod course;
pub mod curriculum;
pub mod error;
pub mod materials;
pub mod profile;
mod rest;
pub mod schedule;
pub mod stores;
pub mod syllabus;
pub mod upload;

pub use announcements::{
    Announcement, AnnouncementApi, AnnouncementCreate, AnnouncementUpdate, AuthorProfile,
    CourseAnnouncements, UnseenMeta, DEFAULT_ANNOUNCEMENT_PAGE_SIZE,
};
pub use course::{
    CourseApi, CourseDifficulty, CourseDraft, CourseRead, CourseStatus, CourseType,
    CourseUpdateRequest, DraftRequest, DraftStatus,
};
pub use curriculum::{
    CurriculumApi, CurriculumBrowser, CurriculumChildren, CurriculumNode, FullTreeLevel,
    Intensity, Level, Outcome, Subbranch, Subunit, Unit,
};
pub use error::{BusinessRule, CourseError, CourseResult};
pub use materials::{
    AssignmentStatus, CourseDocument, DocumentCreate, DocumentSelector, DocumentType,
    DocumentUpdate, Homework, HomeworkUpsert, MaterialsApi, StudentHomeworkAssignment,
    StudentInfo, DEFAULT_DOCUMENT_PAGE_SIZE,
};
pub use profile::{
    ApprovalStatus, PersonProfile, ProfileApi, ProfileInfo, ProfileUpdate, SubbranchChange,
    TeacherApproval, TeacherOverview, TeacherReview, TeacherReviews, TeacherSubbranch,
    TeacherUpdate,
};
pub use schedule::{
    parse_time, validate_block, Interval, IntervalSource, ScheduleApi, ScheduleClear,
    ScheduleInsert, ScheduleRemove, ScheduleUpdate, WeeklyBusyMap,
};
pub use stores::{
    AnnouncementState, AnnouncementStore, CourseState, CourseStore, FetchOutcome, ProfileState,
    ProfileStore, TeacherCourses, TeacherCoursesState,
};
pub use syllabus::{
    CourseSyllabus, SubunitTree, SyllabusApi, SyllabusInsert, SyllabusMove, SyllabusOrderWeek,
    SyllabusRemove, SyllabusRow,
};
pub use upload::Upload;
