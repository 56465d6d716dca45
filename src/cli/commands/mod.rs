//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod helpers;
mod login;
mod search;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use sminfo::config::{PortalConfig, Settings};
use sminfo::error::PortalError;

#[derive(Parser)]
#[command(name = "sminfo-cli")]
#[command(about = "Company performance lookup on the SME status information portal")]
#[command(version)]
pub struct Cli {
    /// Login session storage state file
    #[arg(long, global = true, env = "SMINFO_STATE_PATH")]
    state_path: Option<PathBuf>,

    /// Session metadata file
    #[arg(long, global = true, env = "SMINFO_META_PATH")]
    meta_path: Option<PathBuf>,

    /// Default page interaction timeout in milliseconds
    #[arg(long, global = true, env = "SMINFO_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Browser channel (chrome, chromium, msedge)
    #[arg(long, global = true, env = "SMINFO_BROWSER_CHANNEL")]
    channel: Option<String>,

    /// Portal layout overrides (TOML)
    #[arg(long, global = true, env = "SMINFO_PORTAL_CONFIG")]
    portal_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Show the saved login session
    Status,

    /// Log in and save the session
    Login {
        /// Portal user id
        #[arg(long = "id", env = "SMINFO_ID")]
        username: Option<String>,

        /// Portal password
        #[arg(long, env = "SMINFO_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Run the browser headless (only sensible with credentials)
        #[arg(long)]
        headless: bool,

        /// Seconds to wait for a manual login in the browser window
        #[arg(long, default_value_t = 300)]
        manual_wait_seconds: u64,
    },

    /// Search a company and extract its performance tables
    Search {
        /// Search query
        query: String,

        /// Company to pick among the candidates
        #[arg(long)]
        company: Option<String>,

        /// Write the full result as JSON to this file
        #[arg(long = "json")]
        json: Option<PathBuf>,

        /// Table rows to preview per table
        #[arg(long, default_value_t = 6)]
        show_rows: usize,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(path) = &self.state_path {
            settings = settings.with_state_path(path);
        }
        if let Some(path) = &self.meta_path {
            settings = settings.with_meta_path(path);
        }
        if let Some(ms) = self.timeout_ms {
            settings = settings.with_timeout(Duration::from_millis(ms));
        }
        if let Some(channel) = &self.channel {
            settings = settings.with_browser_channel(channel);
        }
        settings
    }

    fn portal_config(&self) -> anyhow::Result<PortalConfig> {
        match &self.portal_config {
            Some(path) => PortalConfig::load(path)
                .with_context(|| format!("Failed to load portal config {}", path.display())),
            None => Ok(PortalConfig::default()),
        }
    }
}

/// Run the CLI and map handled failures to exit codes.
pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = cli.settings();

    let outcome = match &cli.command {
        Commands::Status => status::cmd_status(&settings).await,
        Commands::Login {
            username,
            password,
            headless,
            manual_wait_seconds,
        } => {
            let portal = cli.portal_config()?;
            login::cmd_login(
                settings,
                portal,
                username.clone(),
                password.clone(),
                *headless,
                Duration::from_secs(*manual_wait_seconds),
            )
            .await
        }
        Commands::Search {
            query,
            company,
            json,
            show_rows,
        } => {
            let portal = cli.portal_config()?;
            search::cmd_search(
                settings,
                portal,
                query,
                company.as_deref(),
                json.as_deref(),
                *show_rows,
            )
            .await
        }
    };

    match outcome {
        Ok(code) => Ok(code),
        Err(e) => match e.downcast_ref::<PortalError>() {
            Some(err) => {
                eprintln!("{} {}", style("✗").red(), err);
                Ok(ExitCode::from(err.exit_code()))
            }
            None => Err(e),
        },
    }
}
