//! Browser driver boundary.
//!
//! The portal flow talks to a browser only through [`BrowserLauncher`] and
//! [`PortalPage`]. The Chrome DevTools implementation lives in [`chrome`];
//! tests drive the same flow with an in-memory page.

#[cfg(feature = "browser")]
mod binary;
mod chrome;
mod config;
mod cookies;
#[cfg(feature = "browser")]
mod idle;
#[cfg(feature = "browser")]
mod scripts;
mod selector;
mod types;

#[cfg(feature = "browser")]
pub use binary::{find_browser, resolve_executable};
pub use chrome::ChromeLauncher;
pub use config::BrowserEngineConfig;
pub use selector::SelectorSpec;
pub use types::{BrowserCookie, StorageState};

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::FrameSnapshot;
use crate::error::BrowserError;

/// How a browsing context should be started.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Storage state to seed the context with.
    pub storage_state: Option<PathBuf>,
    /// Engine channel (`chrome`, `chromium`, `msedge`).
    pub channel: String,
    /// Default timeout for single page interactions.
    pub timeout: Duration,
}

/// A located element: the first element matching `spec` in frame `frame`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub frame: usize,
    pub spec: SelectorSpec,
}

/// Link lookup strategies, from strictest to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMatch {
    /// A link whose accessible text equals the target.
    Role,
    /// The first anchor whose text contains the target.
    Contains,
    /// Page-side scan: exact text first, then containment.
    Scripted,
}

impl LinkMatch {
    pub const CHAIN: [LinkMatch; 3] = [LinkMatch::Role, LinkMatch::Contains, LinkMatch::Scripted];
}

/// Page-side actions run in the main frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageScript {
    /// Build a hidden form and post it.
    PostForm {
        action: String,
        fields: Vec<(String, String)>,
    },
    /// Fill and submit the page's own search form. Reports `false` when the
    /// page has no such form.
    SubmitSearch { action: String, keyword: String },
}

/// Starts isolated browsing contexts.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn PortalPage>, BrowserError>;
}

/// One page in an exclusive browsing context.
///
/// Frame indices follow the frame tree in depth-first order; index 0 is the
/// main frame.
#[async_trait]
pub trait PortalPage: Send {
    /// Navigate and wait for the DOM to be ready.
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Read every frame; unreadable frames come back as skipped.
    async fn frame_snapshots(&mut self) -> Result<Vec<FrameSnapshot>, BrowserError>;

    async fn run_script(&mut self, script: &PageScript) -> Result<bool, BrowserError>;

    /// First visible element across all frames, frames outermost and
    /// selectors in order.
    async fn locate_visible(
        &mut self,
        selectors: &[SelectorSpec],
    ) -> Result<Option<Locator>, BrowserError>;

    async fn fill(&mut self, target: &Locator, value: &str) -> Result<(), BrowserError>;

    async fn click(&mut self, target: &Locator) -> Result<(), BrowserError>;

    async fn press(&mut self, target: &Locator, key: &str) -> Result<(), BrowserError>;

    /// Click the first link matching `text` in any frame. `Ok(false)` when
    /// nothing matched.
    async fn click_link(&mut self, text: &str, how: LinkMatch) -> Result<bool, BrowserError>;

    /// Wait until the page stops loading, at most `timeout`.
    async fn wait_for_idle(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    async fn save_storage_state(&mut self, path: &Path) -> Result<(), BrowserError>;

    /// Release the browsing context.
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// Parse a list of configured selector strings.
pub fn parse_selectors(raw: &[String]) -> Vec<SelectorSpec> {
    raw.iter().map(|s| SelectorSpec::parse(s)).collect()
}
