//! Waiting for a page to settle after scripted navigation.
//!
//! Navigating scripts mark the window they act on before scheduling the
//! navigation. The mark turns into `"leaving"` once the document starts to
//! unload and disappears with the old document. A page is settled when no
//! window carries a live mark and every readable document is complete.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use crate::error::BrowserError;

/// A scheduled navigation that has not started unloading after this long
/// is taken to have updated the page in place.
pub const NAVIGATION_GRACE: Duration = Duration::from_millis(1500);

/// Pause between page-state checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Page state as reported by the page-state script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageState {
    /// A navigation was scheduled or is unloading the current document.
    pub pending: bool,
    /// Every readable document reports `readyState === "complete"`.
    pub ready: bool,
}

impl PageState {
    pub fn settled(&self) -> bool {
        !self.pending && self.ready
    }
}

/// Poll `check` until the page is settled or `timeout` elapses.
///
/// Check failures count as "still loading": evaluation fails while the old
/// execution context is torn down.
pub async fn wait_until_settled<F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<(), BrowserError>
where
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = Result<PageState, BrowserError>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(BrowserError::Timeout("waiting for the page to settle".to_string()));
        }

        match check(remaining).await {
            Ok(state) if state.settled() => return Ok(()),
            Ok(state) => debug!("Page not settled yet: {:?}", state),
            Err(e) => debug!("Page state unavailable: {}", e),
        }

        tokio::time::sleep(interval.min(remaining)).await;
    }
}
