//! Configuration for the tutorhub teacher client
//!
//! Settings are read from an optional TOML file and then from `TUTORHUB_*`
//! environment variables (`TUTORHUB_API__BASE_URL`, `TUTORHUB_LECTURE__ROUTE_NAMESPACE`, ...).

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{
    ApiSettings, AppConfig, ExpiredSessionPolicy, LectureSettings, SessionSettings,
    DEFAULT_LECTURE_NAMESPACE, LEGACY_LECTURE_NAMESPACE,
};
