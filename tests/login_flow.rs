//! Login runs against the in-memory portal.

mod common;

use std::time::Duration;

use common::{client, FakeSite};
use sminfo::browser::StorageState;
use sminfo::error::{PortalError, SearchError};
use sminfo::session::SessionMeta;
use sminfo::LoginRequest;
use tempfile::TempDir;

fn credentials(id: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: Some(id.to_string()),
        password: Some(password.to_string()),
        headless: true,
        ..LoginRequest::default()
    }
}

fn site_accepting(id: &str, password: &str) -> FakeSite {
    FakeSite::new().with(|state| state.credentials = Some((id.to_string(), password.to_string())))
}

#[tokio::test]
async fn credential_login_saves_session_and_username() {
    let dir = TempDir::new().unwrap();
    let site = site_accepting("kim01", "secret");
    let portal = client(&site, dir.path());
    assert!(!portal.has_saved_session());

    let saved = portal.login(&credentials(" kim01 ", "secret")).await.unwrap();

    assert_eq!(saved, portal.settings().state_path);
    let state = StorageState::load(&saved).unwrap();
    assert_eq!(state.cookies[0].name, "JSESSIONID");

    let meta: SessionMeta =
        serde_json::from_str(&std::fs::read_to_string(&portal.settings().meta_path).unwrap())
            .unwrap();
    assert_eq!(meta.username, "홍길동");
    assert!(meta.saved_at > 0);

    assert!(portal.has_saved_session());
    assert_eq!(portal.saved_username().as_deref(), Some("홍길동"));
    assert_eq!(portal.login_status_text(), "Logged in as \"홍길동\"");

    let site_state = site.state();
    assert_eq!(site_state.launches.len(), 1);
    assert!(site_state.launches[0].storage_state.is_none());
    assert_eq!(
        site_state.filled,
        [
            ("id".to_string(), "kim01".to_string()),
            ("pwd".to_string(), "secret".to_string())
        ]
    );
    assert_eq!(site_state.closed, 1);
}

#[tokio::test]
async fn wrong_password_keeps_previous_state_untouched() {
    let dir = TempDir::new().unwrap();
    let site = site_accepting("kim01", "secret");
    let portal = client(&site, dir.path());

    let err = portal.login(&credentials("kim01", "wrong")).await.unwrap_err();

    assert!(matches!(err, PortalError::NotLoggedIn(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!portal.settings().state_path.exists());
    assert!(!portal.settings().meta_path.exists());
    assert_eq!(site.state().closed, 1);
}

#[tokio::test]
async fn missing_login_fields_are_reported() {
    let dir = TempDir::new().unwrap();
    let site = site_accepting("kim01", "secret").with(|state| {
        state.login_page = Some("<html><body><p>점검 중입니다</p></body></html>".to_string());
    });

    let err = client(&site, dir.path())
        .login(&credentials("kim01", "secret"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PortalError::Search(SearchError::LoginFieldsMissing)
    ));
    assert_eq!(site.state().closed, 1);
}

#[tokio::test]
async fn manual_login_is_detected_by_polling() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::new().with(|state| state.manual_login_after_checks = Some(3));
    let portal = client(&site, dir.path());

    let request = LoginRequest {
        manual_wait: Duration::from_secs(5),
        ..LoginRequest::default()
    };
    portal.login(&request).await.unwrap();

    assert!(portal.has_saved_session());
    assert!(site.state().filled.is_empty());
    assert!(!site.state().launches[0].headless);
}

#[tokio::test]
async fn manual_login_times_out() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::new();
    let portal = client(&site, dir.path());

    let request = LoginRequest {
        manual_wait: Duration::from_millis(30),
        ..LoginRequest::default()
    };
    let err = portal.login(&request).await.unwrap_err();

    assert!(matches!(err, PortalError::NotLoggedIn(_)));
    assert!(err.to_string().contains("Did not detect"));
    assert!(!portal.has_saved_session());
    assert_eq!(site.state().closed, 1);
}

#[tokio::test]
async fn username_falls_back_to_login_id() {
    let dir = TempDir::new().unwrap();
    let site = site_accepting("kim01", "secret").with(|state| {
        state.landing_page = Some("<html><body><h1>메인</h1></body></html>".to_string());
    });
    let portal = client(&site, dir.path());

    portal.login(&credentials("kim01", "secret")).await.unwrap();

    assert_eq!(portal.saved_username().as_deref(), Some("kim01"));
}
