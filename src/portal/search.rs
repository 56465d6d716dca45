//! The `search` operation.

use regex::Regex;
use tracing::{debug, info, warn};

use super::PortalClient;
use crate::browser::{PageScript, PortalPage};
use crate::candidates::select_candidate;
use crate::document::{FrameOutcome, HtmlDocument};
use crate::error::{PortalError, SearchError};
use crate::models::{Candidate, SearchResult};
use crate::session::LoginState;
use crate::text::normalize;

/// Progress of one search, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchStage {
    Init,
    SessionLoaded,
    SearchSubmitted,
    CandidatesResolved,
    CompanySelected,
    TablesExtracted,
}

/// Parse the result count out of page text. Thousands separators are allowed.
pub fn read_result_count(text: &str, pattern: &Regex) -> Option<u64> {
    let captures = pattern.captures(text)?;
    let digits: String = captures
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    digits.trim().parse().ok()
}

impl PortalClient {
    /// Search for `query`, pick a company and extract its performance tables.
    ///
    /// `company` narrows the pick to an exact (then partial) name match.
    pub async fn search_company(
        &self,
        query: &str,
        company: Option<&str>,
    ) -> Result<SearchResult, PortalError> {
        let query = normalize(query);
        if query.is_empty() {
            return Err(PortalError::InvalidInput("Enter a search query.".to_string()));
        }

        if !self.has_saved_session() {
            return Err(PortalError::not_logged_in(format!(
                "No saved login session: {}",
                self.settings.state_path.display()
            )));
        }

        let mut page = self
            .launcher
            .launch(&self.launch_options(true, true))
            .await?;

        let mut stage = SearchStage::Init;
        let outcome = self
            .run_search(page.as_mut(), &query, company, &mut stage)
            .await;
        match &outcome {
            Ok(result) => info!(
                "Search '{}' finished with {} candidates and {} tables",
                query,
                result.candidates.len(),
                result.performance_tables.len()
            ),
            Err(e) => debug!("Search '{}' stopped after {:?}: {}", query, stage, e),
        }

        if let Err(e) = page.close().await {
            warn!("Failed to close browser: {}", e);
        }
        outcome
    }

    async fn run_search(
        &self,
        page: &mut dyn PortalPage,
        query: &str,
        company: Option<&str>,
        stage: &mut SearchStage,
    ) -> Result<SearchResult, PortalError> {
        self.open_search(page, "").await?;
        *stage = SearchStage::SessionLoaded;

        if self.login_state(page).await? == LoginState::LoggedOut {
            return Err(PortalError::not_logged_in(
                "The login session has expired. Log in again with the login command.",
            ));
        }

        self.submit_query(page, query).await?;
        *stage = SearchStage::SearchSubmitted;

        let candidates = self.resolve_candidates(page, query).await?;
        *stage = SearchStage::CandidatesResolved;

        let selected = select_candidate(&candidates, company)?;
        let mut performance_tables = Vec::new();

        if let Some(chosen) = &selected {
            info!("Selected '{}' (score {})", chosen.name, chosen.match_score);
            self.click_company_link(page, &chosen.name).await?;
            *stage = SearchStage::CompanySelected;

            performance_tables = self.collect_tables(page).await?;
            *stage = SearchStage::TablesExtracted;
        }

        Ok(SearchResult {
            query: query.to_string(),
            candidates,
            selected,
            performance_tables,
        })
    }

    /// Submit through the page's own search form, falling back to a direct
    /// form post carrying the query.
    async fn submit_query(&self, page: &mut dyn PortalPage, query: &str) -> Result<(), PortalError> {
        let script = PageScript::SubmitSearch {
            action: self.portal.site.search_url(),
            keyword: query.to_string(),
        };

        let submitted = match page.run_script(&script).await {
            Ok(submitted) => submitted,
            Err(e) => {
                debug!("Scripted search submission failed: {}", e);
                false
            }
        };

        if submitted {
            self.settle(page).await;
            Ok(())
        } else {
            info!("Search form unavailable, posting the query directly");
            self.open_search(page, query).await
        }
    }

    /// Harvest candidates, retrying through the visible search box once when
    /// enabled. An empty result is turned into the matching error.
    async fn resolve_candidates(
        &self,
        page: &mut dyn PortalPage,
        query: &str,
    ) -> Result<Vec<Candidate>, PortalError> {
        let mut candidates = self.collect_candidates(page, query).await?;

        if candidates.is_empty() && self.portal.candidates.ui_retry {
            match self.retry_through_ui(page, query).await {
                Ok(()) => candidates = self.collect_candidates(page, query).await?,
                Err(e) => debug!("Search retry skipped: {}", e),
            }
        }

        if !candidates.is_empty() {
            return Ok(candidates);
        }

        let error = match self.page_result_count(page).await {
            Some(0) => SearchError::ZeroResults {
                query: query.to_string(),
            },
            _ => SearchError::NoCandidates {
                query: query.to_string(),
            },
        };
        Err(error.into())
    }

    /// Fill the query box and press Enter; click the search button when
    /// that alone produced nothing.
    async fn retry_through_ui(
        &self,
        page: &mut dyn PortalPage,
        query: &str,
    ) -> Result<(), PortalError> {
        let Some(input) = page.locate_visible(&self.selectors.query_input).await? else {
            return Err(SearchError::ElementNotFound("search query input".to_string()).into());
        };

        page.fill(&input, query).await?;
        page.press(&input, "Enter").await?;
        self.settle(page).await;

        if self.collect_candidates(page, query).await?.is_empty() {
            if let Some(button) = page.locate_visible(&self.selectors.search_button).await? {
                page.click(&button).await?;
                self.settle(page).await;
            }
        }
        Ok(())
    }

    /// Result count shown in the main frame, if any.
    async fn page_result_count(&self, page: &mut dyn PortalPage) -> Option<u64> {
        let snapshots = match page.frame_snapshots().await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                debug!("Could not read the result count: {}", e);
                return None;
            }
        };

        let main = snapshots.iter().find(|frame| frame.index == 0)?;
        let FrameOutcome::Loaded { html } = &main.outcome else {
            return None;
        };
        let text = HtmlDocument::parse(main.url.clone(), html).body_text();
        read_result_count(&text, &self.result_count)
    }
}
