//! Navigation steps shared by login and search.

use tracing::{debug, info};

use super::PortalClient;
use crate::browser::{LaunchOptions, LinkMatch, PageScript, PortalPage};
use crate::candidates::harvest_candidates;
use crate::document::{FrameDocument, FrameSnapshot};
use crate::error::{PortalError, SearchError};
use crate::models::{Candidate, TableData};
use crate::session::{detect_login_state, LoginState};
use crate::tables::harvest_tables;
use crate::text::normalize;

impl PortalClient {
    pub(super) fn launch_options(&self, headless: bool, with_session: bool) -> LaunchOptions {
        LaunchOptions {
            headless,
            storage_state: with_session.then(|| self.settings.state_path.clone()),
            channel: self.settings.browser_channel.clone(),
            timeout: self.settings.timeout,
        }
    }

    /// Open the search page by posting the search form directly.
    pub(super) async fn open_search(
        &self,
        page: &mut dyn PortalPage,
        query: &str,
    ) -> Result<(), PortalError> {
        let site = &self.portal.site;
        page.goto(&site.base_url).await?;

        let script = PageScript::PostForm {
            action: site.search_url(),
            fields: vec![
                ("cmMenuId".to_string(), site.search_menu_id.clone()),
                ("cmQuery".to_string(), query.to_string()),
                ("mode".to_string(), "fast".to_string()),
            ],
        };
        page.run_script(&script).await?;
        self.settle(page).await;
        Ok(())
    }

    /// Let the page finish loading, then pause for late scripts.
    pub(super) async fn settle(&self, page: &mut dyn PortalPage) {
        if let Err(e) = page.wait_for_idle(self.settings.timeout).await {
            debug!("Page did not go idle: {}", e);
        }
        tokio::time::sleep(self.portal.timing.settle_delay).await;
    }

    pub(super) async fn login_state(
        &self,
        page: &mut dyn PortalPage,
    ) -> Result<LoginState, PortalError> {
        Ok(detect_login_state(
            page,
            &self.portal.site.login_url_markers,
            &self.selectors.login_id,
            &self.selectors.login_password,
        )
        .await?)
    }

    pub(super) async fn collect_candidates(
        &self,
        page: &mut dyn PortalPage,
        keyword: &str,
    ) -> Result<Vec<Candidate>, PortalError> {
        let snapshots = page.frame_snapshots().await?;
        Ok(self.candidates_in(&snapshots, keyword))
    }

    fn candidates_in(&self, snapshots: &[FrameSnapshot], keyword: &str) -> Vec<Candidate> {
        let frames = FrameDocument::parse_all(snapshots);
        harvest_candidates(&frames, keyword, &self.portal.candidates)
    }

    pub(super) async fn collect_tables(
        &self,
        page: &mut dyn PortalPage,
    ) -> Result<Vec<TableData>, PortalError> {
        let snapshots = page.frame_snapshots().await?;
        let frames = FrameDocument::parse_all(&snapshots);
        Ok(harvest_tables(&frames, &self.scorer))
    }

    /// Click the company link, trying each lookup strategy across all frames.
    pub(super) async fn click_company_link(
        &self,
        page: &mut dyn PortalPage,
        company: &str,
    ) -> Result<(), PortalError> {
        let target = normalize(company);

        for how in LinkMatch::CHAIN {
            match page.click_link(&target, how).await {
                Ok(true) => {
                    info!("Opened '{}' ({:?} lookup)", target, how);
                    self.settle(page).await;
                    return Ok(());
                }
                Ok(false) => debug!("No {:?} link for '{}'", how, target),
                Err(e) => debug!("{:?} link lookup failed: {}", how, e),
            }
        }

        Err(SearchError::LinkNotClickable(company.to_string()).into())
    }
}
