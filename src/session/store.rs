//! Session files on disk: the browser storage state and a small metadata
//! record naming the logged-in user.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PortalError;
use crate::text::normalize;

/// Environment variable used as the username when no metadata names one.
pub const USERNAME_ENV: &str = "SMINFO_ID";

/// Metadata written after every successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    #[serde(default)]
    pub username: String,
    /// Unix seconds.
    #[serde(default)]
    pub saved_at: i64,
}

/// Locations of the persisted session files.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state_path: PathBuf,
    meta_path: PathBuf,
}

impl SessionStore {
    pub fn new(state_path: impl Into<PathBuf>, meta_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            meta_path: meta_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    pub fn has_saved_session(&self) -> bool {
        self.state_path.exists()
    }

    /// Read the metadata record; unreadable records count as absent.
    pub fn read_meta(&self) -> Option<SessionMeta> {
        let content = std::fs::read_to_string(&self.meta_path).ok()?;
        match serde_json::from_str(&content) {
            Ok(meta) => Some(meta),
            Err(e) => {
                debug!("Ignoring unreadable session meta {:?}: {}", self.meta_path, e);
                None
            }
        }
    }

    pub fn write_meta(&self, username: Option<&str>) -> Result<SessionMeta, PortalError> {
        let meta = SessionMeta {
            username: username.map(normalize).unwrap_or_default(),
            saved_at: Utc::now().timestamp(),
        };

        if let Some(parent) = self.meta_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.meta_path, serde_json::to_string_pretty(&meta)?)?;
        info!("Saved session meta to {:?}", self.meta_path);

        Ok(meta)
    }

    /// Username from the metadata record, else from `SMINFO_ID`.
    pub fn saved_username(&self) -> Option<String> {
        self.saved_username_or(std::env::var(USERNAME_ENV).ok().as_deref())
    }

    /// Username from the metadata record, else `fallback`.
    pub fn saved_username_or(&self, fallback: Option<&str>) -> Option<String> {
        self.read_meta()
            .map(|meta| normalize(&meta.username))
            .filter(|name| !name.is_empty())
            .or_else(|| fallback.map(normalize).filter(|name| !name.is_empty()))
    }

    /// One-line description of the login session.
    pub fn status_text(&self) -> String {
        self.status_text_with(self.saved_username())
    }

    fn status_text_with(&self, username: Option<String>) -> String {
        match username {
            Some(name) => format!("Logged in as \"{}\"", name),
            None if self.has_saved_session() => "Login session in use".to_string(),
            None => "No login session".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &Path) -> SessionStore {
        SessionStore::new(dir.join("state.json"), dir.join("meta/session_meta.json"))
    }

    #[test]
    fn writes_and_reads_meta() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let written = store.write_meta(Some("  홍길동 ")).unwrap();
        assert_eq!(written.username, "홍길동");
        assert!(written.saved_at > 0);
        assert_eq!(store.read_meta(), Some(written));
        assert_eq!(store.saved_username_or(Some("env-user")), Some("홍길동".to_string()));
    }

    #[test]
    fn empty_meta_username_uses_fallback() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        store.write_meta(None).unwrap();

        assert_eq!(store.saved_username_or(Some(" env-user ")), Some("env-user".to_string()));
        assert_eq!(store.saved_username_or(Some("  ")), None);
    }

    #[test]
    fn corrupt_meta_uses_fallback() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        std::fs::create_dir_all(dir.path().join("meta")).unwrap();
        std::fs::write(store.meta_path(), "{broken").unwrap();

        assert_eq!(store.read_meta(), None);
        assert_eq!(store.saved_username_or(Some("env-user")), Some("env-user".to_string()));
        assert_eq!(store.saved_username_or(None), None);
    }

    #[test]
    fn status_text_variants() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        assert_eq!(store.status_text_with(None), "No login session");

        std::fs::write(store.state_path(), "{}").unwrap();
        assert!(store.has_saved_session());
        assert_eq!(store.status_text_with(None), "Login session in use");
        assert_eq!(
            store.status_text_with(Some("홍길동".to_string())),
            "Logged in as \"홍길동\""
        );
    }
}
