//! Runtime settings and site layout configuration.
//!
//! [`Settings`] holds per-installation values (paths, timeout, browser channel)
//! with environment overrides. [`PortalConfig`] describes the portal itself:
//! URLs, selector candidates and the keyword lists driving the heuristics.
//! Both have defaults matching the live site; the portal layout can be
//! replaced from a TOML file when the site changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// Default directory for session files, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".data";
/// Default per-operation timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 45_000;
/// Default browser engine channel.
pub const DEFAULT_BROWSER_CHANNEL: &str = "chrome";

/// Per-installation runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Persisted browser storage state (cookies).
    pub state_path: PathBuf,
    /// Session metadata record (`{username, saved_at}`).
    pub meta_path: PathBuf,
    /// Default timeout for page interactions.
    pub timeout: Duration,
    /// Browser engine channel (`chrome`, `chromium`, `msedge`).
    pub browser_channel: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl Settings {
    fn base_default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            state_path: data_dir.join("storage_state.json"),
            meta_path: data_dir.join("session_meta.json"),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            browser_channel: DEFAULT_BROWSER_CHANNEL.to_string(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `SMINFO_STATE_PATH`: storage state file
    /// - `SMINFO_META_PATH`: session metadata file
    /// - `SMINFO_TIMEOUT_MS`: default timeout in milliseconds
    /// - `SMINFO_BROWSER_CHANNEL`: browser channel
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("SMINFO_STATE_PATH").filter(|s| !s.is_empty()) {
            self.state_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("SMINFO_META_PATH").filter(|s| !s.is_empty()) {
            self.meta_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("SMINFO_TIMEOUT_MS") {
            if let Ok(ms) = val.trim().parse() {
                self.timeout = Duration::from_millis(ms);
            }
        }
        if let Some(val) = lookup("SMINFO_BROWSER_CHANNEL") {
            self.browser_channel = val.trim().to_string();
        }
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    pub fn with_meta_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meta_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_browser_channel(mut self, channel: &str) -> Self {
        self.browser_channel = channel.trim().to_string();
        self
    }
}

/// Full description of the portal layout and the heuristics tuned for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub site: SiteConfig,
    pub selectors: SelectorConfig,
    pub candidates: CandidateRules,
    pub tables: TableRules,
    pub timing: TimingConfig,
}

impl PortalConfig {
    /// Load a portal layout from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, PortalError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, PortalError> {
        toml::from_str(content).map_err(|e| PortalError::Config(e.to_string()))
    }
}

/// Portal endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    /// Path the search form posts to.
    pub search_path: String,
    /// Menu id carried as a hidden field on the direct form post.
    pub search_menu_id: String,
    /// URL fragments identifying the login page.
    pub login_url_markers: Vec<String>,
    /// Body text pattern carrying the result count; group 1 is the number.
    pub result_count_pattern: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sminfo.mss.go.kr".to_string(),
            search_path: "/gc/sf/GSF002R0.print".to_string(),
            search_menu_id: "421010100".to_string(),
            login_url_markers: strings(&["CMM004R0", "CMM004R1"]),
            result_count_pattern: r"검색결과\s*([0-9,]+)\s*건".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.search_path)
    }
}

/// Selector candidates for page elements, tried in order.
///
/// Entries are CSS selectors, optionally suffixed with `:has-text('...')`
/// to require the element text to contain a fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub query_input: Vec<String>,
    pub search_button: Vec<String>,
    pub login_id: Vec<String>,
    pub login_password: Vec<String>,
    pub login_button: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            query_input: strings(&[
                "input[name='cmQuery']",
                "input#cmQuery",
                "input[title*='검색']",
                "input[placeholder*='검색']",
                "input[type='search']",
                "input[type='text']",
            ]),
            search_button: strings(&[
                "button:has-text('검색')",
                "a:has-text('검색')",
                "input[type='submit'][value*='검색']",
                ".btn_search",
            ]),
            login_id: strings(&["#id", "input[name='id']", "#login_id", "input[name='login_id']"]),
            login_password: strings(&[
                "#pwd",
                "input[name='pwd']",
                "#login_password",
                "input[name='login_password']",
            ]),
            login_button: strings(&[
                "button:has-text('로그인')",
                "input[type='submit'][value*='로그인']",
                ".login_btn",
            ]),
        }
    }
}

/// Scoring and filtering rules for company candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRules {
    pub exact_match_score: u32,
    pub contains_match_score: u32,
    pub row_match_score: u32,
    /// Maximum number of ranked candidates returned.
    pub max_candidates: usize,
    /// Preceding-sibling text longer than this is not used as a table title.
    pub max_title_chars: usize,
    pub min_anchor_chars: usize,
    pub max_anchor_chars: usize,
    /// Navigation words never treated as company names (compared lower-cased).
    pub anchor_stoplist: Vec<String>,
    /// Retry through the visible search box when scripted submission finds nothing.
    pub ui_retry: bool,
}

impl Default for CandidateRules {
    fn default() -> Self {
        Self {
            exact_match_score: 100,
            contains_match_score: 60,
            row_match_score: 20,
            max_candidates: 50,
            max_title_chars: 60,
            min_anchor_chars: 2,
            max_anchor_chars: 70,
            anchor_stoplist: strings(&[
                "로그인",
                "회원가입",
                "홈",
                "사이트맵",
                "검색",
                "조회",
                "닫기",
                "메뉴",
                "다음",
                "이전",
                "상세보기",
                "more",
            ]),
            ui_retry: true,
        }
    }
}

/// Relevance rules for performance tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    /// Domain keywords, each worth `keyword_score` when present.
    pub financial_keywords: Vec<String>,
    /// Pattern for a year-like token.
    pub year_pattern: String,
    pub year_score: u32,
    pub keyword_score: u32,
    pub min_relevant_score: u32,
    pub max_tables: usize,
    /// Tables returned when nothing reaches `min_relevant_score`.
    pub fallback_tables: usize,
    /// Rows included in the scoring text.
    pub rows_scanned: usize,
    pub max_title_chars: usize,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            financial_keywords: strings(&[
                "재무", "실적", "매출", "영업", "순이익", "당기", "자산", "부채", "회계", "연도",
            ]),
            year_pattern: r"20\d{2}".to_string(),
            year_score: 3,
            keyword_score: 2,
            min_relevant_score: 4,
            max_tables: 10,
            fallback_tables: 3,
            rows_scanned: 20,
            max_title_chars: 80,
        }
    }
}

/// Fixed delays used by the navigation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after every navigation before reading the page.
    #[serde(with = "millis")]
    pub settle_delay: Duration,
    /// Interval between login-state checks while waiting for a login.
    #[serde(with = "millis")]
    pub login_poll_interval: Duration,
    /// How long a scripted credential login may take.
    #[serde(with = "millis")]
    pub credential_login_wait: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(700),
            login_poll_interval: Duration::from_secs(1),
            credential_login_wait: Duration::from_secs(30),
        }
    }
}

/// Durations are written as integer milliseconds in TOML.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
