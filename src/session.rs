use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::SessionUser;

pub const USER_KEY: &str = "user";
pub const LOGGED_IN_KEY: &str = "isLoggedIn";
pub const LOGGED_IN_AT_KEY: &str = "loggedInAt";

const SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Flat string key/value storage persisted as one JSON object on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    /// Drops every key, including ones this client never wrote.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save_login(&self, user: &Value, now: DateTime<Utc>) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(USER_KEY.to_string(), serde_json::to_string(user)?);
        items.insert(LOGGED_IN_KEY.to_string(), "true".to_string());
        items.insert(LOGGED_IN_AT_KEY.to_string(), now.to_rfc3339());
        self.write_all(&items)
    }

    /// Reads back the stored identity. Sessions older than `max_age`, or
    /// without a login timestamp, are cleared and reported as logged out.
    pub fn current_user(
        &self,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionUser>> {
        let items = self.read_all()?;
        if items.get(LOGGED_IN_KEY).map(String::as_str) != Some("true") {
            return Ok(None);
        }

        let logged_in_at = items
            .get(LOGGED_IN_AT_KEY)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc));
        let fresh = logged_in_at.is_some_and(|at| now.signed_duration_since(at) <= max_age);
        if !fresh {
            info!(path = %self.path.display(), "stored session expired, clearing");
            self.clear()?;
            return Ok(None);
        }

        let Some(raw_user) = items.get(USER_KEY) else {
            return Ok(None);
        };
        match serde_json::from_str::<SessionUser>(raw_user) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(error = %err, "stored user record is unreadable");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        (dir, store)
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let (_dir, store) = store();
        assert_eq!(store.get_item(USER_KEY).unwrap(), None);
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_set_get_remove() {
        let (_dir, store) = store();
        store.set_item("theme", "dark").unwrap();
        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("dark"));
        store.remove_item("theme").unwrap();
        assert_eq!(store.get_item("theme").unwrap(), None);
    }

    #[test]
    fn test_save_login_persists_user_and_flag() {
        let (_dir, store) = store();
        let now = Utc::now();
        store
            .save_login(&json!({"username": "asha", "email": "asha@example.com"}), now)
            .unwrap();

        assert_eq!(store.get_item(LOGGED_IN_KEY).unwrap().as_deref(), Some("true"));
        let raw = store.get_item(USER_KEY).unwrap().unwrap();
        let user: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(user["username"], "asha");

        let current = store.current_user(Duration::hours(1), now).unwrap().unwrap();
        assert_eq!(current.username, "asha");
    }

    #[test]
    fn test_clear_drops_unrelated_keys() {
        let (_dir, store) = store();
        store.set_item("token", "xyz").unwrap();
        store.save_login(&json!({"username": "asha"}), Utc::now()).unwrap();

        store.clear().unwrap();
        assert_eq!(store.get_item("token").unwrap(), None);
        assert_eq!(store.get_item(USER_KEY).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_expired_session_is_cleared() {
        let (_dir, store) = store();
        let logged_in = Utc::now() - Duration::hours(200);
        store.save_login(&json!({"username": "asha"}), logged_in).unwrap();

        let current = store.current_user(Duration::hours(168), Utc::now()).unwrap();
        assert!(current.is_none());
        assert_eq!(store.get_item(LOGGED_IN_KEY).unwrap(), None);
    }

    #[test]
    fn test_session_without_timestamp_is_not_trusted() {
        let (_dir, store) = store();
        store.set_item(USER_KEY, r#"{"username":"asha"}"#).unwrap();
        store.set_item(LOGGED_IN_KEY, "true").unwrap();

        let current = store.current_user(Duration::hours(168), Utc::now()).unwrap();
        assert!(current.is_none());
    }

    #[test]
    fn test_logged_out_flag_means_no_user() {
        let (_dir, store) = store();
        store.set_item(USER_KEY, r#"{"username":"asha"}"#).unwrap();
        store.set_item(LOGGED_IN_KEY, "false").unwrap();

        assert!(store.current_user(Duration::hours(1), Utc::now()).unwrap().is_none());
    }
}
