//! Session status command.

use std::process::ExitCode;

use console::style;

use sminfo::config::Settings;
use sminfo::session::SessionStore;

/// Report whether a saved session exists. Exits 1 when it does not.
pub async fn cmd_status(settings: &Settings) -> anyhow::Result<ExitCode> {
    let store = SessionStore::new(&settings.state_path, &settings.meta_path);

    if !store.has_saved_session() {
        println!(
            "{} No session file: {}",
            style("!").yellow(),
            settings.state_path.display()
        );
        return Ok(ExitCode::from(1));
    }

    println!(
        "{} Session file exists: {}",
        style("✓").green(),
        settings.state_path.display()
    );
    println!("  {}", store.status_text());
    Ok(ExitCode::SUCCESS)
}
