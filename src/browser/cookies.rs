//! Storage state loading and saving.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use super::types::{BrowserCookie, StorageState};
use crate::error::BrowserError;

impl StorageState {
    /// Load a storage state file.
    pub fn load(path: &Path) -> Result<Self, BrowserError> {
        debug!("Loading storage state from {:?}", path);

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            BrowserError::Driver(format!("Invalid storage state {}: {}", path.display(), e))
        })
    }

    /// Write the state as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), BrowserError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BrowserError::Driver(format!("Failed to encode storage state: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;

        info!("Saved {} cookies to {:?}", self.cookies.len(), path);

        Ok(())
    }

    /// Cookies worth restoring: named, scoped to a domain and not expired.
    pub fn usable_cookies(&self) -> impl Iterator<Item = &BrowserCookie> {
        let now = Utc::now().timestamp() as f64;
        self.cookies.iter().filter(move |cookie| {
            !cookie.name.is_empty()
                && !cookie.domain.is_empty()
                && (cookie.expires <= 0.0 || cookie.expires > now)
        })
    }
}
