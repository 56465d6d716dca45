//! Chrome DevTools driver built on chromiumoxide.

#[cfg(feature = "browser")]
pub use self::cdp::ChromeLauncher;
#[cfg(not(feature = "browser"))]
pub use self::stub::ChromeLauncher;

#[cfg(feature = "browser")]
mod cdp {
    use std::path::Path;
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchKeyEventParams, DispatchKeyEventType,
    };
    use chromiumoxide::cdp::browser_protocol::network::{
        CookieParam, CookieSameSite, SetCookiesParams, TimeSinceEpoch,
    };
    use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use tokio::task::JoinHandle;
    use tracing::{debug, info, warn};

    use super::super::binary::find_browser;
    use super::super::idle::{wait_until_settled, PageState, POLL_INTERVAL};
    use super::super::scripts::{self, RawFrame, RawLocation};
    use super::super::{
        BrowserCookie, BrowserEngineConfig, BrowserLauncher, LaunchOptions, LinkMatch, Locator,
        PageScript, PortalPage, SelectorSpec, StorageState,
    };
    use crate::document::FrameSnapshot;
    use crate::error::BrowserError;

    fn driver(context: &str, e: impl std::fmt::Display) -> BrowserError {
        BrowserError::Driver(format!("{}: {}", context, e))
    }

    /// Launches a local Chromium-family browser per operation.
    pub struct ChromeLauncher {
        base: BrowserEngineConfig,
    }

    impl ChromeLauncher {
        pub fn new(base: BrowserEngineConfig) -> Self {
            Self { base }
        }
    }

    impl Default for ChromeLauncher {
        fn default() -> Self {
            Self::new(BrowserEngineConfig::default().with_env_overrides())
        }
    }

    #[async_trait]
    impl BrowserLauncher for ChromeLauncher {
        async fn launch(
            &self,
            options: &LaunchOptions,
        ) -> Result<Box<dyn PortalPage>, BrowserError> {
            let config = self.base.clone().for_launch(options);
            let chrome_path = find_browser(&config)?;

            info!(
                "Launching browser (headless={}, channel={})",
                config.headless, config.channel
            );

            let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

            // Set headless mode (with_head means NOT headless)
            if !config.headless {
                builder = builder.with_head();
            }

            builder = builder
                .arg("--lang=ko-KR")
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--disable-infobars")
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--disable-sync")
                .arg("--disable-translate");

            for arg in &config.chrome_args {
                builder = builder.arg(arg);
            }

            let browser_config = builder
                .build()
                .map_err(|e| driver("Failed to build browser config", e))?;

            let (browser, mut handler) = Browser::launch(browser_config)
                .await
                .map_err(|e| driver("Failed to launch browser", e))?;

            let handler_task = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = match browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    handler_task.abort();
                    return Err(driver("Failed to open page", e));
                }
            };

            let chrome_page = ChromePage {
                browser,
                page,
                handler_task,
                timeout: config.timeout,
            };

            if let Some(path) = options.storage_state.as_deref() {
                restore_state(&chrome_page.page, path).await;
            }

            Ok(Box::new(chrome_page))
        }
    }

    struct ChromePage {
        browser: Browser,
        page: Page,
        handler_task: JoinHandle<()>,
        timeout: Duration,
    }

    async fn eval<T: DeserializeOwned>(
        page: &Page,
        timeout: Duration,
        script: String,
    ) -> Result<T, BrowserError> {
        let result = tokio::time::timeout(timeout, page.evaluate(script))
            .await
            .map_err(|_| BrowserError::Timeout("script evaluation".to_string()))?
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| BrowserError::Script(format!("Unexpected script result: {}", e)))
    }

    fn same_site(value: &str) -> Option<CookieSameSite> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(CookieSameSite::Strict),
            "lax" => Some(CookieSameSite::Lax),
            "none" => Some(CookieSameSite::None),
            _ => None,
        }
    }

    fn cookie_param(cookie: &BrowserCookie) -> Result<CookieParam, String> {
        let mut builder = CookieParam::builder()
            .name(cookie.name.clone())
            .value(cookie.value.clone())
            .domain(cookie.domain.clone())
            .path(cookie.path.clone())
            .secure(cookie.secure)
            .http_only(cookie.http_only);
        if cookie.expires > 0.0 {
            builder = builder.expires(TimeSinceEpoch::new(cookie.expires));
        }
        if let Some(policy) = cookie.same_site.as_deref().and_then(same_site) {
            builder = builder.same_site(policy);
        }
        builder.build()
    }

    /// Load saved cookies into the browser. Goes through the network domain
    /// so it works before the first navigation.
    async fn restore_state(page: &Page, path: &Path) {
        let state = match StorageState::load(path) {
            Ok(state) => state,
            Err(e) => {
                warn!("Could not restore storage state: {}", e);
                return;
            }
        };

        let mut params = Vec::new();
        for cookie in state.usable_cookies() {
            match cookie_param(cookie) {
                Ok(param) => params.push(param),
                Err(e) => warn!("Failed to build cookie {}: {}", cookie.name, e),
            }
        }
        if params.is_empty() {
            return;
        }

        let count = params.len();
        match page.execute(SetCookiesParams::new(params)).await {
            Ok(_) => debug!("Restored {} cookies", count),
            Err(e) => warn!("Failed to restore cookies: {}", e),
        }
    }

    /// Send a key press to whatever element has focus.
    async fn dispatch_key(page: &Page, key: &str) -> Result<(), BrowserError> {
        let (code, text) = match key {
            "Enter" => (13, Some("\r")),
            "Tab" => (9, Some("\t")),
            "Escape" => (27, None),
            _ => (0, None),
        };

        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let is_down = matches!(kind, DispatchKeyEventType::KeyDown);
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(key)
                .code(key)
                .windows_virtual_key_code(code)
                .native_virtual_key_code(code);
            if let (true, Some(text)) = (is_down, text) {
                builder = builder.text(text);
            }
            let params = builder
                .build()
                .map_err(|e| driver("Failed to build key event", e))?;
            page.execute(params)
                .await
                .map_err(|e| driver("Key press failed", e))?;
        }
        Ok(())
    }

    impl ChromePage {
        async fn eval<T: DeserializeOwned>(&mut self, script: String) -> Result<T, BrowserError> {
            eval(&self.page, self.timeout, script).await
        }

        async fn expect_true(&mut self, script: String, what: &str) -> Result<(), BrowserError> {
            if self.eval::<bool>(script).await? {
                Ok(())
            } else {
                Err(BrowserError::Script(format!("{} had no effect", what)))
            }
        }
    }

    #[async_trait]
    impl PortalPage for ChromePage {
        async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
            info!("Navigating to {}", url);
            let nav_params = NavigateParams::builder()
                .url(url)
                .build()
                .map_err(|e| driver("Invalid URL", e))?;

            tokio::time::timeout(self.timeout, self.page.execute(nav_params))
                .await
                .map_err(|_| BrowserError::Timeout(format!("navigating to {}", url)))?
                .map_err(|e| driver("Navigation failed", e))?;

            self.wait_for_idle(self.timeout).await
        }

        async fn current_url(&mut self) -> Result<String, BrowserError> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| driver("Failed to read URL", e))?;
            Ok(url.map(|u| u.to_string()).unwrap_or_default())
        }

        async fn frame_snapshots(&mut self) -> Result<Vec<FrameSnapshot>, BrowserError> {
            let frames: Vec<RawFrame> = self.eval(scripts::snapshot_frames()).await?;
            Ok(frames
                .into_iter()
                .map(|frame| match (frame.html, frame.error) {
                    (Some(html), _) => FrameSnapshot::loaded(frame.index, frame.url, html),
                    (None, error) => FrameSnapshot::skipped(
                        frame.index,
                        frame.url,
                        error.unwrap_or_else(|| "no document".to_string()),
                    ),
                })
                .collect())
        }

        async fn run_script(&mut self, script: &PageScript) -> Result<bool, BrowserError> {
            self.eval(scripts::page_script(script)).await
        }

        async fn locate_visible(
            &mut self,
            selectors: &[SelectorSpec],
        ) -> Result<Option<Locator>, BrowserError> {
            let found: Option<RawLocation> = self.eval(scripts::locate_visible(selectors)).await?;
            Ok(found.and_then(|hit| {
                selectors.get(hit.position).map(|spec| Locator {
                    frame: hit.frame,
                    spec: spec.clone(),
                })
            }))
        }

        async fn fill(&mut self, target: &Locator, value: &str) -> Result<(), BrowserError> {
            self.expect_true(scripts::fill(target.frame, &target.spec, value), "fill")
                .await
        }

        async fn click(&mut self, target: &Locator) -> Result<(), BrowserError> {
            self.expect_true(scripts::click(target.frame, &target.spec), "click")
                .await
        }

        async fn press(&mut self, target: &Locator, key: &str) -> Result<(), BrowserError> {
            self.expect_true(scripts::focus(target.frame, &target.spec), "focus")
                .await?;
            dispatch_key(&self.page, key).await
        }

        async fn click_link(&mut self, text: &str, how: LinkMatch) -> Result<bool, BrowserError> {
            self.eval(scripts::click_link(text, how)).await
        }

        async fn wait_for_idle(&mut self, timeout: Duration) -> Result<(), BrowserError> {
            let page = &self.page;
            wait_until_settled(timeout, POLL_INTERVAL, move |remaining| {
                eval::<PageState>(page, remaining, scripts::page_state())
            })
            .await
        }

        async fn save_storage_state(&mut self, path: &Path) -> Result<(), BrowserError> {
            let cookies = self
                .page
                .get_cookies()
                .await
                .map_err(|e| driver("Failed to read cookies", e))?;
            debug!("Got {} cookies from browser", cookies.len());

            let state = StorageState {
                cookies: cookies
                    .iter()
                    .map(|c| BrowserCookie {
                        name: c.name.clone(),
                        value: c.value.clone(),
                        domain: c.domain.clone(),
                        path: c.path.clone(),
                        expires: c.expires,
                        http_only: c.http_only,
                        secure: c.secure,
                        same_site: c.same_site.as_ref().map(|s| format!("{:?}", s)),
                    })
                    .collect(),
                origins: Vec::new(),
            };
            state.save(path)
        }

        async fn close(self: Box<Self>) -> Result<(), BrowserError> {
            let ChromePage {
                mut browser,
                page,
                handler_task,
                ..
            } = *self;

            if let Err(e) = page.close().await {
                debug!("Page close failed: {}", e);
            }
            let closed = browser
                .close()
                .await
                .map(|_| ())
                .map_err(|e| driver("Failed to close browser", e));
            if let Err(e) = browser.wait().await {
                debug!("Browser did not exit cleanly: {}", e);
            }
            handler_task.abort();
            closed
        }
    }

}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
mod stub {
    use async_trait::async_trait;

    use super::super::{BrowserEngineConfig, BrowserLauncher, LaunchOptions, PortalPage};
    use crate::error::BrowserError;

    pub struct ChromeLauncher;

    impl ChromeLauncher {
        pub fn new(_base: BrowserEngineConfig) -> Self {
            Self
        }
    }

    impl Default for ChromeLauncher {
        fn default() -> Self {
            Self
        }
    }

    #[async_trait]
    impl BrowserLauncher for ChromeLauncher {
        async fn launch(
            &self,
            _options: &LaunchOptions,
        ) -> Result<Box<dyn PortalPage>, BrowserError> {
            Err(BrowserError::NotCompiled)
        }
    }
}
