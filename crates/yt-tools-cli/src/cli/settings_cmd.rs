//! `yt-tools settings`: inspect and edit the settings file.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use yt_tools::SettingsStore;

use crate::cli::output;

/// Print one value, or `null` when unset.
pub fn run_get(settings_path: &Path, key: &str) -> Result<()> {
    let store = SettingsStore::new(settings_path);
    let value: Option<Value> = store.try_get(key)?;
    let value = value.unwrap_or(Value::Null);
    if output::is_json() {
        output::print_json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{value}");
    }
    Ok(())
}

/// Store a value. `raw` is parsed as JSON, falling back to a plain string.
pub fn run_set(settings_path: &Path, key: &str, raw: &str) -> Result<()> {
    let store = SettingsStore::new(settings_path);
    let value = parse_value(raw);
    store
        .try_set(key, &value)
        .with_context(|| format!("failed to write {}", settings_path.display()))?;
    output::status(&format!("{key} = {value}"));
    Ok(())
}

/// Remove a value.
pub fn run_remove(settings_path: &Path, key: &str) -> Result<()> {
    let store = SettingsStore::new(settings_path);
    if store.remove(key)? {
        output::status(&format!("Removed {key}"));
    } else {
        output::status(&format!("{key} was not set"));
    }
    Ok(())
}

/// List every stored value.
pub fn run_list(settings_path: &Path) -> Result<()> {
    let store = SettingsStore::new(settings_path);
    let entries = store.entries()?;

    if output::is_json() {
        let map: serde_json::Map<String, Value> = entries.into_iter().collect();
        output::print_json(&map);
        return Ok(());
    }

    output::status(&format!("Settings: {}", settings_path.display()));
    if entries.is_empty() {
        output::status("  (empty)");
    }
    for (key, value) in entries {
        println!("{key} = {value}");
    }
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
