//! Locating a Chromium-family browser executable for a channel.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::BrowserEngineConfig;
use crate::error::BrowserError;

/// Commands and install locations per channel, in preference order.
const CHROME: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/opt/google/chrome/google-chrome",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

const MSEDGE: &[&str] = &[
    "microsoft-edge",
    "microsoft-edge-stable",
    "/opt/microsoft/msedge/msedge",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

const CHROMIUM: &[&str] = &[
    "chromium",
    "chromium-browser",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

const INSTALL_HINT: &str = "Chrome/Chromium not found. Please install it:\n\
     - Arch/Manjaro: sudo pacman -S chromium\n\
     - Ubuntu/Debian: sudo apt install chromium-browser\n\
     - Fedora: sudo dnf install chromium\n\
     - Or download from: https://www.google.com/chrome/";

fn channel_candidates(channel: &str) -> Option<&'static [&'static str]> {
    match channel {
        "chrome" | "chrome-stable" => Some(CHROME),
        "msedge" | "msedge-stable" => Some(MSEDGE),
        "chromium" => Some(CHROMIUM),
        _ => None,
    }
}

/// Find the executable for the configured channel on this machine.
pub fn find_browser(config: &BrowserEngineConfig) -> Result<PathBuf, BrowserError> {
    resolve_executable(&config.channel, config.executable.as_deref(), probe)
}

fn probe(candidate: &str) -> Option<PathBuf> {
    let path = Path::new(candidate);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }
    which::which(candidate).ok()
}

/// Resolve an executable with an explicit probe.
///
/// An explicit path wins when it exists. An unknown or missing channel falls
/// back to any Chromium-family install with a warning.
pub fn resolve_executable(
    channel: &str,
    explicit: Option<&Path>,
    probe: impl Fn(&str) -> Option<PathBuf>,
) -> Result<PathBuf, BrowserError> {
    if let Some(path) = explicit {
        if let Some(found) = probe(&path.to_string_lossy()) {
            info!("Using browser from CHROME_PATH: {}", found.display());
            return Ok(found);
        }
        warn!("CHROME_PATH {} does not exist, searching instead", path.display());
    }

    let channel = channel.trim().to_lowercase();
    let first = |candidates: &[&str]| candidates.iter().find_map(|c| probe(c));

    if channel.is_empty() || channel == "chromium" {
        return first(CHROMIUM).ok_or_else(|| BrowserError::Unavailable(INSTALL_HINT.to_string()));
    }

    if let Some(found) = channel_candidates(&channel).and_then(first) {
        info!("Found {} at: {}", channel, found.display());
        return Ok(found);
    }

    let fallback = first(CHROMIUM).or_else(|| first(CHROME)).or_else(|| first(MSEDGE));
    match fallback {
        Some(found) => {
            warn!(
                "Browser channel '{}' is not available, falling back to {}",
                channel,
                found.display()
            );
            Ok(found)
        }
        None => Err(BrowserError::Unavailable(INSTALL_HINT.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(names: &'static [&'static str]) -> impl Fn(&str) -> Option<PathBuf> {
        move |candidate: &str| {
            names
                .contains(&candidate)
                .then(|| PathBuf::from(format!("/found/{}", candidate.trim_start_matches('/'))))
        }
    }

    #[test]
    fn channel_binary_is_preferred() {
        let found =
            resolve_executable("chrome", None, installed(&["chromium", "google-chrome"])).unwrap();
        assert_eq!(found, PathBuf::from("/found/google-chrome"));
    }

    #[test]
    fn missing_channel_falls_back_to_chromium() {
        let found = resolve_executable("msedge", None, installed(&["chromium-browser"])).unwrap();
        assert_eq!(found, PathBuf::from("/found/chromium-browser"));
    }

    #[test]
    fn unknown_channel_falls_back() {
        let found = resolve_executable("firefox", None, installed(&["google-chrome"])).unwrap();
        assert_eq!(found, PathBuf::from("/found/google-chrome"));
    }

    #[test]
    fn explicit_path_wins_when_present() {
        let found = resolve_executable(
            "chrome",
            Some(Path::new("/opt/custom/chrome")),
            installed(&["/opt/custom/chrome", "google-chrome"]),
        )
        .unwrap();
        assert_eq!(found, PathBuf::from("/found/opt/custom/chrome"));
    }

    #[test]
    fn nothing_installed_is_a_missing_dependency() {
        let err = resolve_executable("chrome", None, installed(&[])).unwrap_err();
        assert!(err.is_missing_dependency());

        let err = resolve_executable("", None, installed(&["google-chrome"])).unwrap_err();
        assert!(err.is_missing_dependency());
    }
}
