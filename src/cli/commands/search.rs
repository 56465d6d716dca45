//! Company search command.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use console::style;

use sminfo::browser::{BrowserEngineConfig, ChromeLauncher};
use sminfo::config::{PortalConfig, Settings};
use sminfo::portal::PortalClient;

use super::helpers::{format_summary, spinner, write_json};

/// Search, print a summary and optionally write the full result as JSON.
pub async fn cmd_search(
    settings: Settings,
    portal: PortalConfig,
    query: &str,
    company: Option<&str>,
    json: Option<&Path>,
    show_rows: usize,
) -> anyhow::Result<ExitCode> {
    let launcher = Arc::new(ChromeLauncher::new(
        BrowserEngineConfig::default().with_env_overrides(),
    ));
    let client = PortalClient::new(settings, portal, launcher)?;

    let pb = spinner(format!("Searching '{}'...", query.trim()));
    let result = client.search_company(query, company).await;
    pb.finish_and_clear();
    let result = result?;

    print!("{}", format_summary(&result, show_rows));

    if let Some(path) = json {
        write_json(path, &result)?;
        println!("\n{} JSON saved: {}", style("✓").green(), path.display());
    }

    Ok(ExitCode::SUCCESS)
}
