//! The `login` operation: establish a session and persist it.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::PortalClient;
use crate::browser::PortalPage;
use crate::document::FrameDocument;
use crate::error::{PortalError, SearchError};
use crate::session::{detect_username, LoginState};
use crate::text::normalize;

/// Default time a human gets to finish logging in.
pub const DEFAULT_MANUAL_WAIT: Duration = Duration::from_secs(300);

/// Parameters of one login attempt.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub headless: bool,
    /// Deadline for a manual login when no credentials are given.
    pub manual_wait: Duration,
}

impl Default for LoginRequest {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            headless: false,
            manual_wait: DEFAULT_MANUAL_WAIT,
        }
    }
}

impl LoginRequest {
    /// Id and password, when both are present and non-blank.
    pub fn credentials(&self) -> Option<(String, &str)> {
        let username = normalize(self.username.as_deref()?);
        let password = self.password.as_deref()?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some((username, password))
    }
}

impl PortalClient {
    /// Log in and save the session. Returns the storage state path.
    pub async fn login(&self, request: &LoginRequest) -> Result<PathBuf, PortalError> {
        let mut page = self
            .launcher
            .launch(&self.launch_options(request.headless, false))
            .await?;

        let outcome = self.run_login(page.as_mut(), request).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close browser: {}", e);
        }
        outcome
    }

    async fn run_login(
        &self,
        page: &mut dyn PortalPage,
        request: &LoginRequest,
    ) -> Result<PathBuf, PortalError> {
        self.open_search(page, "").await?;

        if self.login_state(page).await? == LoginState::LoggedOut {
            match request.credentials() {
                Some((username, password)) => {
                    info!("Submitting credentials for {}", username);
                    self.submit_credentials(page, &username, password).await?;
                }
                None => {
                    info!(
                        "Waiting up to {}s for a manual login",
                        request.manual_wait.as_secs()
                    );
                    if !self.wait_until_logged_in(page, request.manual_wait).await {
                        return Err(PortalError::not_logged_in(
                            "Did not detect a completed login. Try again.",
                        ));
                    }
                }
            }
        }

        if self.login_state(page).await? == LoginState::LoggedOut {
            return Err(PortalError::not_logged_in(
                "Login failed. Check the id and password.",
            ));
        }

        let detected = match page.frame_snapshots().await {
            Ok(snapshots) => {
                let frames = FrameDocument::parse_all(&snapshots);
                detect_username(&frames)
            }
            Err(e) => {
                debug!("Could not read the page for the username: {}", e);
                None
            }
        };
        let fallback = request
            .username
            .as_deref()
            .map(normalize)
            .filter(|name| !name.is_empty());

        self.session.write_meta(detected.or(fallback).as_deref())?;
        page.save_storage_state(self.session.state_path()).await?;

        Ok(self.session.state_path().to_path_buf())
    }

    async fn submit_credentials(
        &self,
        page: &mut dyn PortalPage,
        username: &str,
        password: &str,
    ) -> Result<(), PortalError> {
        let id_field = page.locate_visible(&self.selectors.login_id).await?;
        let password_field = page.locate_visible(&self.selectors.login_password).await?;
        let (Some(id_field), Some(password_field)) = (id_field, password_field) else {
            return Err(SearchError::LoginFieldsMissing.into());
        };

        page.fill(&id_field, username).await?;
        page.fill(&password_field, password).await?;

        match page.locate_visible(&self.selectors.login_button).await? {
            Some(button) => page.click(&button).await?,
            None => page.press(&password_field, "Enter").await?,
        }

        if !self
            .wait_until_logged_in(page, self.portal.timing.credential_login_wait)
            .await
        {
            return Err(PortalError::not_logged_in(
                "Login failed. Check the id and password.",
            ));
        }
        Ok(())
    }

    /// Poll the login state until logged in or `wait` elapses.
    async fn wait_until_logged_in(&self, page: &mut dyn PortalPage, wait: Duration) -> bool {
        let deadline = Instant::now() + wait;

        while Instant::now() < deadline {
            tokio::time::sleep(self.portal.timing.login_poll_interval).await;
            match self.login_state(page).await {
                Ok(LoginState::LoggedIn) => return true,
                Ok(LoginState::LoggedOut) => {}
                Err(e) => debug!("Login check failed: {}", e),
            }
        }
        false
    }
}
