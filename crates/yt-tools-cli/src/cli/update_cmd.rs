//! `yt-tools check-update`: compare against the published version.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use yt_tools::{HttpClient, SettingsStore, UpdateChecker, UpdateStatus};

use crate::cli::output;
use crate::config;

/// Run the update check. With `skip`, an available version is marked skipped.
pub async fn run(settings_path: &Path, force: bool, skip: bool) -> Result<()> {
    let http = HttpClient::new();
    let settings = SettingsStore::new(settings_path);
    let checker = UpdateChecker::new(
        &http,
        &settings,
        config::resolve_manifest_url(),
        env!("CARGO_PKG_VERSION"),
    );

    let status = checker.check(force, Utc::now()).await?;
    if skip {
        if let UpdateStatus::Available { latest, .. } = &status {
            checker.skip(latest);
        }
    }

    if output::is_json() {
        output::print_json(&status);
        return Ok(());
    }

    match status {
        UpdateStatus::Available { current, latest } if skip => {
            output::status(&format!("Skipping version {latest} (running {current})"));
        }
        UpdateStatus::Available { current, latest } => {
            println!("Update available: {current} -> {latest}");
        }
        UpdateStatus::UpToDate { current, .. } => {
            output::status(&format!("yt-tools {current} is up to date"));
        }
        UpdateStatus::Skipped { latest, .. } => {
            output::status(&format!("Version {latest} was skipped"));
        }
        UpdateStatus::NotDue { next_check } => {
            output::status(&format!(
                "Checked recently; next check after {}",
                next_check.format("%Y-%m-%d %H:%M UTC")
            ));
        }
    }
    Ok(())
}
