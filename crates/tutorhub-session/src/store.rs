//! Session persistence

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SessionResult;
use crate::models::Session;

/// Key the session is stored under
pub const SESSION_KEY: &str = "app_session_v1";

/// Durable storage for the signed-in session
pub trait SessionStore: Send + Sync {
    /// Stored session, `None` when nothing (readable) is stored
    fn load(&self) -> SessionResult<Option<Session>>;

    fn save(&self, session: &Session) -> SessionResult<()>;

    fn clear(&self) -> SessionResult<()>;
}

/// JSON file holding a key-value map, the session under [`SESSION_KEY`]
///
/// A file that does not parse is deleted and reported as empty.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> SessionResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!("Discarding unreadable session file {:?}: {}", self.path, e);
                fs::remove_file(&self.path)?;
                Ok(Map::new())
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> SessionResult<Option<Session>> {
        let mut map = self.read_map()?;
        let Some(value) = map.remove(SESSION_KEY) else {
            return Ok(None);
        };
        match serde_json::from_value::<Session>(value) {
            Ok(session) => {
                debug!("Loaded session from {:?}", self.path);
                Ok(Some(session))
            }
            Err(e) => {
                warn!("Discarding malformed stored session: {}", e);
                self.write_map(&map)?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> SessionResult<()> {
        let mut map = self.read_map()?;
        map.insert(SESSION_KEY.to_string(), serde_json::to_value(session)?);
        self.write_map(&map)?;
        debug!("Saved session to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        let mut map = self.read_map()?;
        if map.remove(SESSION_KEY).is_none() {
            return Ok(());
        }
        if map.is_empty() {
            fs::remove_file(&self.path)?;
        } else {
            self.write_map(&map)?;
        }
        debug!("Cleared session from {:?}", self.path);
        Ok(())
    }
}

/// In-process store, used in tests and for one-shot CLI invocations
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> SessionResult<Option<Session>> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &Session) -> SessionResult<()> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        self.session.lock().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expiration: 1_700_000_000_000,
            identifier: "5550001".into(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(SESSION_KEY));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_entry_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"app_session_v1": {"access_token": 3}, "theme": "dark"}"#).unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().unwrap().is_none());

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains(SESSION_KEY));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::with_session(sample());
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
