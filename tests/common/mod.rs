//! In-memory portal used to drive the login and search flows.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use sminfo::browser::{
    BrowserCookie, BrowserLauncher, LaunchOptions, LinkMatch, Locator, PageScript, PortalPage,
    SelectorSpec, StorageState,
};
use sminfo::config::{PortalConfig, Settings};
use sminfo::document::FrameSnapshot;
use sminfo::error::BrowserError;
use sminfo::portal::PortalClient;
use sminfo::text::normalize;

pub const BASE_URL: &str = "https://portal.test";
pub const LOGIN_URL: &str = "https://portal.test/cm/CMM004R0.do";
pub const SEARCH_URL: &str = "https://portal.test/gc/sf/GSF002R0.print";

pub const LOGIN_PAGE: &str = r#"<html><body>
<form name="login">
  <input id="id" name="id" type="text">
  <input id="pwd" name="pwd" type="password">
  <button type="submit">로그인</button>
</form>
</body></html>"#;

pub const LANDING_PAGE: &str = r#"<html><body>
<div class="top"><a href="/my">홍길동님</a><a href="/logout">로그아웃</a></div>
<form name="search">
  <input name="cmQuery" type="text">
  <button type="button">검색</button>
</form>
</body></html>"#;

/// What the page shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Blank,
    Home,
    Login,
    Landing,
    Results(String),
    Detail(String),
}

/// Scripted portal behaviour plus a record of what the client did.
#[derive(Debug, Default)]
pub struct SiteState {
    // behaviour
    pub session_valid: bool,
    pub search_form: bool,
    pub role_lookup_fails: bool,
    pub browser_missing: bool,
    pub credentials: Option<(String, String)>,
    pub manual_login_after_checks: Option<usize>,
    pub login_page: Option<String>,
    pub landing_page: Option<String>,
    pub results: HashMap<String, String>,
    pub details: HashMap<String, Vec<String>>,

    // record
    pub launches: Vec<LaunchOptions>,
    pub closed: usize,
    pub posted_queries: Vec<String>,
    pub scripted_searches: Vec<String>,
    pub filled: Vec<(String, String)>,
    pub pressed: Vec<String>,
    pub clicked_links: Vec<(String, LinkMatch)>,
    pub login_checks: usize,
}

#[derive(Clone, Default)]
pub struct FakeSite {
    state: Arc<Mutex<SiteState>>,
}

impl FakeSite {
    pub fn new() -> Self {
        let site = Self::default();
        {
            let mut state = site.state();
            state.session_valid = true;
            state.search_form = true;
        }
        site
    }

    pub fn state(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap()
    }

    pub fn with(self, configure: impl FnOnce(&mut SiteState)) -> Self {
        configure(&mut self.state());
        self
    }

    pub fn launcher(&self) -> Arc<FakeLauncher> {
        Arc::new(FakeLauncher { site: self.clone() })
    }
}

pub struct FakeLauncher {
    site: FakeSite,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn PortalPage>, BrowserError> {
        let mut state = self.site.state();
        if state.browser_missing {
            return Err(BrowserError::Unavailable("no browser in test".to_string()));
        }
        state.launches.push(options.clone());

        let restored = options
            .storage_state
            .as_deref()
            .map(Path::exists)
            .unwrap_or(false);

        Ok(Box::new(FakePage {
            site: self.site.clone(),
            view: View::Blank,
            url: "about:blank".to_string(),
            logged_in: restored && state.session_valid,
            values: HashMap::new(),
        }))
    }
}

pub struct FakePage {
    site: FakeSite,
    view: View,
    url: String,
    logged_in: bool,
    values: HashMap<String, String>,
}

impl FakePage {
    fn show(&mut self, view: View) {
        self.url = match &view {
            View::Blank => "about:blank".to_string(),
            View::Home => BASE_URL.to_string(),
            View::Login => LOGIN_URL.to_string(),
            View::Landing | View::Results(_) => SEARCH_URL.to_string(),
            View::Detail(name) => format!("{}/detail?name={}", BASE_URL, name),
        };
        self.view = view;
    }

    fn frames(&self) -> Vec<String> {
        let state = self.site.state();
        match &self.view {
            View::Blank => vec!["<html><body></body></html>".to_string()],
            View::Home => vec!["<html><body><h1>home</h1></body></html>".to_string()],
            View::Login => vec![state
                .login_page
                .clone()
                .unwrap_or_else(|| LOGIN_PAGE.to_string())],
            View::Landing => vec![state
                .landing_page
                .clone()
                .unwrap_or_else(|| LANDING_PAGE.to_string())],
            View::Results(query) => vec![state
                .results
                .get(query)
                .cloned()
                .unwrap_or_else(|| LANDING_PAGE.to_string())],
            View::Detail(name) => state.details.get(name).cloned().unwrap_or_default(),
        }
    }

    fn log_in(&mut self) {
        self.logged_in = true;
        self.show(View::Landing);
    }

    fn try_credentials(&mut self) {
        let expected = self.site.state().credentials.clone();
        let given = (
            self.values.get("id").cloned().unwrap_or_default(),
            self.values.get("pwd").cloned().unwrap_or_default(),
        );
        if expected.as_ref() == Some(&given) {
            self.log_in();
        }
    }

    fn field_name(&self, target: &Locator) -> Option<String> {
        let frames = self.frames();
        let html = Html::parse_document(frames.get(target.frame)?);
        let element = find(&html, &target.spec)?;
        element.value().attr("name").map(str::to_string)
    }
}

fn find<'a>(html: &'a Html, spec: &SelectorSpec) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&spec.css).ok()?;
    html.select(&selector)
        .find(|el| spec.matches_text(&el.text().collect::<String>()))
}

fn visible(element: ElementRef<'_>) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .all(|el| {
            let style = el.value().attr("style").unwrap_or_default().replace(' ', "");
            el.value().attr("hidden").is_none() && !style.contains("display:none")
        })
}

#[async_trait]
impl PortalPage for FakePage {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        if url.trim_end_matches('/') == BASE_URL {
            self.show(View::Home);
            Ok(())
        } else {
            Err(BrowserError::Driver(format!("unexpected url {}", url)))
        }
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        if self.view == View::Login {
            let mut state = self.site.state();
            state.login_checks += 1;
            let human_done = state
                .manual_login_after_checks
                .map(|n| state.login_checks >= n)
                .unwrap_or(false);
            drop(state);
            if human_done {
                self.log_in();
            }
        }
        Ok(self.url.clone())
    }

    async fn frame_snapshots(&mut self) -> Result<Vec<FrameSnapshot>, BrowserError> {
        let mut snapshots: Vec<FrameSnapshot> = self
            .frames()
            .into_iter()
            .enumerate()
            .map(|(index, html)| FrameSnapshot::loaded(index, self.url.clone(), html))
            .collect();
        let next = snapshots.len();
        snapshots.push(FrameSnapshot::skipped(
            next,
            "https://ads.example/",
            "cross-origin frame",
        ));
        Ok(snapshots)
    }

    async fn run_script(&mut self, script: &PageScript) -> Result<bool, BrowserError> {
        match script {
            PageScript::PostForm { action, fields } => {
                assert_eq!(action, SEARCH_URL);
                let query = fields
                    .iter()
                    .find(|(name, _)| name == "cmQuery")
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default();
                self.site.state().posted_queries.push(query.clone());

                if !self.logged_in {
                    self.show(View::Login);
                } else if query.is_empty() {
                    self.show(View::Landing);
                } else {
                    self.show(View::Results(query));
                }
                Ok(true)
            }
            PageScript::SubmitSearch { keyword, .. } => {
                let has_form = self.site.state().search_form;
                if !has_form {
                    return Ok(false);
                }
                self.site.state().scripted_searches.push(keyword.clone());
                self.show(View::Results(keyword.clone()));
                Ok(true)
            }
        }
    }

    async fn locate_visible(
        &mut self,
        selectors: &[SelectorSpec],
    ) -> Result<Option<Locator>, BrowserError> {
        for (frame, source) in self.frames().iter().enumerate() {
            let html = Html::parse_document(source);
            for spec in selectors {
                if find(&html, spec).map(visible).unwrap_or(false) {
                    return Ok(Some(Locator {
                        frame,
                        spec: spec.clone(),
                    }));
                }
            }
        }
        Ok(None)
    }

    async fn fill(&mut self, target: &Locator, value: &str) -> Result<(), BrowserError> {
        let name = self
            .field_name(target)
            .ok_or_else(|| BrowserError::Script(format!("cannot fill {}", target.spec.raw)))?;
        self.site
            .state()
            .filled
            .push((name.clone(), value.to_string()));
        self.values.insert(name, value.to_string());
        Ok(())
    }

    async fn click(&mut self, _target: &Locator) -> Result<(), BrowserError> {
        if self.view == View::Login {
            self.try_credentials();
        }
        Ok(())
    }

    async fn press(&mut self, target: &Locator, key: &str) -> Result<(), BrowserError> {
        self.site.state().pressed.push(key.to_string());
        if key != "Enter" {
            return Ok(());
        }
        match (&self.view, self.field_name(target).as_deref()) {
            (View::Login, _) => self.try_credentials(),
            (_, Some("cmQuery")) => {
                let query = self.values.get("cmQuery").cloned().unwrap_or_default();
                self.show(View::Results(query));
            }
            _ => {}
        }
        Ok(())
    }

    async fn click_link(&mut self, text: &str, how: LinkMatch) -> Result<bool, BrowserError> {
        self.site
            .state()
            .clicked_links
            .push((text.to_string(), how));
        if how == LinkMatch::Role && self.site.state().role_lookup_fails {
            return Err(BrowserError::Script("role lookup unsupported".to_string()));
        }

        let target = normalize(text);
        let anchors = Selector::parse("a").map_err(|e| BrowserError::Script(e.to_string()))?;
        for source in self.frames() {
            let html = Html::parse_document(&source);
            let texts: Vec<String> = html
                .select(&anchors)
                .map(|a| normalize(&a.text().collect::<String>()))
                .collect();
            let hit = match how {
                LinkMatch::Role => texts.iter().find(|t| **t == target),
                LinkMatch::Contains => texts.iter().find(|t| t.contains(&target)),
                LinkMatch::Scripted => texts
                    .iter()
                    .find(|t| **t == target)
                    .or_else(|| texts.iter().find(|t| t.contains(&target))),
            };
            if let Some(name) = hit.cloned() {
                self.show(View::Detail(name));
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn wait_for_idle(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn save_storage_state(&mut self, path: &Path) -> Result<(), BrowserError> {
        StorageState {
            cookies: vec![BrowserCookie {
                name: "JSESSIONID".to_string(),
                value: "fake-session".to_string(),
                domain: "portal.test".to_string(),
                path: "/".to_string(),
                expires: -1.0,
                http_only: true,
                secure: true,
                same_site: None,
            }],
            origins: Vec::new(),
        }
        .save(path)
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.site.state().closed += 1;
        Ok(())
    }
}

/// Portal layout pointing at the fake site with near-zero delays.
pub fn portal_config() -> PortalConfig {
    let mut portal = PortalConfig::default();
    portal.site.base_url = BASE_URL.to_string();
    portal.timing.settle_delay = Duration::ZERO;
    portal.timing.login_poll_interval = Duration::from_millis(1);
    portal.timing.credential_login_wait = Duration::from_millis(50);
    portal
}

pub fn settings(dir: &Path) -> Settings {
    Settings::default()
        .with_state_path(dir.join("state/storage_state.json"))
        .with_meta_path(dir.join("state/session_meta.json"))
        .with_timeout(Duration::from_secs(1))
        .with_browser_channel("chromium")
}

pub fn client(site: &FakeSite, dir: &Path) -> PortalClient {
    PortalClient::new(settings(dir), portal_config(), site.launcher()).unwrap()
}

/// Write a storage state file so the client considers the session saved.
pub fn save_session(dir: &Path) -> PathBuf {
    let path = settings(dir).state_path;
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"cookies":[],"origins":[]}"#).unwrap();
    path
}

pub fn results_page(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, region)| {
            format!(
                r#"<tr><td><a href="javascript:void(0)">{}</a></td><td>{}</td></tr>"#,
                name, region
            )
        })
        .collect();
    format!(
        r#"<html><body>
<form name="search"><input name="cmQuery" type="text"><button>검색</button></form>
<p>검색결과 {} 건</p>
<h3>기업 목록</h3>
<table><thead><tr><th>기업명</th><th>지역</th></tr></thead><tbody>{}</tbody></table>
</body></html>"#,
        rows.len(),
        body
    )
}

pub const PERFORMANCE_PAGE: &str = r#"<html><body>
<div class="nav"><table><tr><td>홈</td><td>사이트맵</td></tr></table></div>
<div class="finance">
  <h3>주요 실적</h3>
  <table>
    <thead><tr><th>연도</th><th>매출</th></tr></thead>
    <tbody><tr><td>2023</td><td>100</td></tr><tr><td>2022</td><td>90</td></tr></tbody>
  </table>
</div>
</body></html>"#;
