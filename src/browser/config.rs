//! Browser engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::LaunchOptions;
use crate::config::{DEFAULT_BROWSER_CHANNEL, DEFAULT_TIMEOUT_MS};

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    pub headless: bool,

    /// Preferred engine channel.
    pub channel: String,

    /// Explicit browser executable, bypassing discovery.
    pub executable: Option<PathBuf>,

    /// Timeout for a single page interaction.
    pub timeout: Duration,

    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: true,
            channel: DEFAULT_BROWSER_CHANNEL.to_string(),
            executable: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            chrome_args: Vec::new(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `CHROME_PATH`: browser executable
    /// - `SMINFO_CHROME_ARGS`: extra arguments, whitespace separated
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("CHROME_PATH").filter(|s| !s.trim().is_empty()) {
            self.executable = Some(PathBuf::from(path.trim()));
        }
        if let Some(args) = lookup("SMINFO_CHROME_ARGS") {
            self.chrome_args
                .extend(args.split_whitespace().map(str::to_string));
        }
        self
    }

    /// This configuration specialised for one launch.
    pub fn for_launch(mut self, options: &LaunchOptions) -> Self {
        self.headless = options.headless;
        self.channel = options.channel.trim().to_string();
        self.timeout = options.timeout;
        self
    }
}
