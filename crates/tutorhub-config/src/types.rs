//! Configuration types

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Route namespace of the live-lecture endpoints in current backends
pub const DEFAULT_LECTURE_NAMESPACE: &str = "/api/course/course/lesson";

/// Route namespace used by older backends that expose the video endpoints separately
pub const LEGACY_LECTURE_NAMESPACE: &str = "/api/zoom/course/lesson";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub lecture: LectureSettings,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every `/api/...` path is appended to
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: None,
            proxy: None,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// What to do with a persisted session whose expiration already passed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredSessionPolicy {
    /// Delete it on load; the user signs in again
    #[default]
    Discard,
    /// Load it anyway so the first 401 can refresh it
    KeepForRefresh,
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Session file; defaults to `<data_dir>/tutorhub/session.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    pub expired_policy: ExpiredSessionPolicy,
    /// Device identifier reported to the authenticate endpoints
    pub device_token: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            storage_path: None,
            expired_policy: ExpiredSessionPolicy::default(),
            device_token: "web-client".to_string(),
        }
    }
}

impl SessionSettings {
    /// Effective session file location
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tutorhub")
                .join("session.json")
        })
    }
}

/// Live-lecture settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LectureSettings {
    pub route_namespace: String,
    pub status_poll_interval_secs: u64,
    pub heartbeat_interval_secs: u64,
    /// Display name used when joining the video session
    pub user_name: String,
    pub language: String,
    pub region: String,
}

impl Default for LectureSettings {
    fn default() -> Self {
        Self {
            route_namespace: DEFAULT_LECTURE_NAMESPACE.to_string(),
            status_poll_interval_secs: 30,
            heartbeat_interval_secs: 15,
            user_name: "Teacher".to_string(),
            language: "en-US".to_string(),
            region: "Global".to_string(),
        }
    }
}

impl LectureSettings {
    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_secs(self.status_poll_interval_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.lecture.route_namespace, DEFAULT_LECTURE_NAMESPACE);
        assert_eq!(config.lecture.heartbeat_interval(), Duration::from_secs(15));
        assert_eq!(config.lecture.status_poll_interval(), Duration::from_secs(30));
        assert_eq!(config.session.expired_policy, ExpiredSessionPolicy::Discard);
        assert_eq!(config.session.device_token, "web-client");
    }

    #[test]
    fn test_policy_wire_names() {
        let parsed: SessionSettings =
            toml::from_str("expired_policy = \"keep_for_refresh\"").unwrap();
        assert_eq!(parsed.expired_policy, ExpiredSessionPolicy::KeepForRefresh);
    }

    #[test]
    fn test_storage_path_override() {
        let settings = SessionSettings {
            storage_path: Some(PathBuf::from("/tmp/s.json")),
            ..Default::default()
        };
        assert_eq!(settings.resolved_storage_path(), PathBuf::from("/tmp/s.json"));
        assert!(SessionSettings::default()
            .resolved_storage_path()
            .ends_with("tutorhub/session.json"));
    }
}
