//! Portal client: the `login` and `search` operations.
//!
//! Each operation launches its own browsing context through a
//! [`BrowserLauncher`], drives the portal, and closes the context on every
//! exit path.

mod login;
mod navigate;
mod search;

pub use login::LoginRequest;
pub use search::{read_result_count, SearchStage};

use std::sync::Arc;

use regex::Regex;

use crate::browser::{parse_selectors, BrowserLauncher, SelectorSpec};
use crate::config::{PortalConfig, Settings};
use crate::error::PortalError;
use crate::session::SessionStore;
use crate::tables::TableScorer;

/// Selector lists parsed once per client.
struct Selectors {
    query_input: Vec<SelectorSpec>,
    search_button: Vec<SelectorSpec>,
    login_id: Vec<SelectorSpec>,
    login_password: Vec<SelectorSpec>,
    login_button: Vec<SelectorSpec>,
}

/// Client for the SME status information portal.
pub struct PortalClient {
    settings: Settings,
    portal: PortalConfig,
    launcher: Arc<dyn BrowserLauncher>,
    session: SessionStore,
    selectors: Selectors,
    scorer: TableScorer,
    result_count: Regex,
}

impl PortalClient {
    pub fn new(
        settings: Settings,
        portal: PortalConfig,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, PortalError> {
        let scorer = TableScorer::new(portal.tables.clone())
            .map_err(|e| PortalError::Config(format!("tables.year_pattern: {}", e)))?;
        let result_count = Regex::new(&portal.site.result_count_pattern)
            .map_err(|e| PortalError::Config(format!("site.result_count_pattern: {}", e)))?;

        let selectors = Selectors {
            query_input: parse_selectors(&portal.selectors.query_input),
            search_button: parse_selectors(&portal.selectors.search_button),
            login_id: parse_selectors(&portal.selectors.login_id),
            login_password: parse_selectors(&portal.selectors.login_password),
            login_button: parse_selectors(&portal.selectors.login_button),
        };

        Ok(Self {
            session: SessionStore::new(&settings.state_path, &settings.meta_path),
            settings,
            portal,
            launcher,
            selectors,
            scorer,
            result_count,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn has_saved_session(&self) -> bool {
        self.session.has_saved_session()
    }

    pub fn saved_username(&self) -> Option<String> {
        self.session.saved_username()
    }

    pub fn login_status_text(&self) -> String {
        self.session.status_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ChromeLauncher;

    #[test]
    fn invalid_patterns_are_config_errors() {
        let mut portal = PortalConfig::default();
        portal.site.result_count_pattern = "([0-9".to_string();

        let err = PortalClient::new(Settings::default(), portal, Arc::new(ChromeLauncher::default()))
            .err()
            .unwrap();
        assert!(matches!(err, PortalError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
