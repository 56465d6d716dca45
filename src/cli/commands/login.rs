//! Login command.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use console::style;

use sminfo::browser::{BrowserEngineConfig, ChromeLauncher};
use sminfo::config::{PortalConfig, Settings};
use sminfo::portal::{LoginRequest, PortalClient};

use super::helpers::spinner;

/// Log in (with credentials or by hand) and save the session.
pub async fn cmd_login(
    settings: Settings,
    portal: PortalConfig,
    username: Option<String>,
    password: Option<String>,
    headless: bool,
    manual_wait: Duration,
) -> anyhow::Result<ExitCode> {
    let launcher = Arc::new(ChromeLauncher::new(
        BrowserEngineConfig::default().with_env_overrides(),
    ));
    let client = PortalClient::new(settings, portal, launcher)?;

    let request = LoginRequest {
        username,
        password,
        headless,
        manual_wait,
    };

    let message = if request.credentials().is_some() {
        "Logging in...".to_string()
    } else {
        println!(
            "{} Log in in the browser window. The session is saved automatically within {} seconds.",
            style("→").cyan(),
            manual_wait.as_secs()
        );
        "Waiting for login...".to_string()
    };

    let pb = spinner(message);
    let result = client.login(&request).await;
    pb.finish_and_clear();
    let state_path = result?;

    println!(
        "{} Login session saved: {}",
        style("✓").green(),
        state_path.display()
    );
    println!("  {}", client.login_status_text());
    Ok(ExitCode::SUCCESS)
}
