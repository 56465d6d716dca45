//! Login-state classification and logged-in username detection.

use crate::browser::{PortalPage, SelectorSpec};
use crate::document::{DomQuery, FrameDocument};
use crate::error::BrowserError;
use crate::text::{char_len, normalize};

/// Whether the current page belongs to an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    LoggedIn,
    LoggedOut,
}

const USERNAME_INPUTS: &str = "input[name='cmId'], input[name='id']";
const PROFILE_NODES: &str = ".user, .my_info, .member, .login_info";
const HONORIFIC: char = '님';
const BLOCKED_NAMES: &[&str] = &["로그인", "로그아웃", "회원가입", "나의정보"];
const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 60;

pub fn is_login_url(url: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && url.contains(marker.as_str()))
}

/// Classify the page: a login URL, or a visible id field together with a
/// visible password field, means logged out.
pub async fn detect_login_state(
    page: &mut dyn PortalPage,
    login_url_markers: &[String],
    id_selectors: &[SelectorSpec],
    password_selectors: &[SelectorSpec],
) -> Result<LoginState, BrowserError> {
    let url = page.current_url().await?;
    if is_login_url(&url, login_url_markers) {
        return Ok(LoginState::LoggedOut);
    }

    let id_field = page.locate_visible(id_selectors).await?;
    let password_field = page.locate_visible(password_selectors).await?;
    if id_field.is_some() && password_field.is_some() {
        Ok(LoginState::LoggedOut)
    } else {
        Ok(LoginState::LoggedIn)
    }
}

/// Best guess at the logged-in user's display name, frame by frame.
pub fn detect_username(frames: &[FrameDocument]) -> Option<String> {
    frames
        .iter()
        .find_map(|frame| username_in(&frame.document))
}

fn username_in<D: DomQuery>(doc: &D) -> Option<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |value: &str| {
        let value = normalize(value);
        let len = char_len(&value);
        if (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) && !BLOCKED_NAMES.contains(&value.as_str())
        {
            found.push(value);
        }
    };

    for input in doc.select(USERNAME_INPUTS).ok()? {
        push(&doc.attribute(input, "value").unwrap_or_default());
    }

    if let Ok(Some(profile)) = doc.select(PROFILE_NODES).map(|nodes| nodes.into_iter().next()) {
        push(&doc.text(profile));
    }

    if let Ok(anchors) = doc.select("a") {
        for anchor in anchors {
            let text = normalize(&doc.text(anchor));
            if let Some(name) = text.strip_suffix(HONORIFIC) {
                push(name);
            }
        }
    }

    found.into_iter().next()
}
