//! Configuration loading and resolution.
//!
//! Every value resolves as explicit flag, then environment variable, then
//! built-in default.

use std::path::PathBuf;

use yt_tools::download::{DEFAULT_API_ENDPOINT, DEFAULT_WEB_TOOL};

pub const SETTINGS_ENV: &str = "YT_TOOLS_SETTINGS";
pub const COBALT_API_ENV: &str = "YT_TOOLS_COBALT_API";
pub const COBALT_WEB_ENV: &str = "YT_TOOLS_COBALT_WEB";
pub const MANIFEST_ENV: &str = "YT_TOOLS_MANIFEST_URL";
pub const CHROMIUM_ENV: &str = "YT_TOOLS_CHROMIUM_PATH";

/// Published userscript header, read for its `@version`.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://github.com/RynAgain/Youtube_Tampermonkey/raw/main/YouTubeTools.user.js";

/// Resolve the settings file path.
pub fn resolve_settings_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(SETTINGS_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    default_settings_path()
}

fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("yt-tools").join("settings.json")
}

/// Resolve the Cobalt API endpoint.
pub fn resolve_cobalt_endpoint(explicit: Option<&str>) -> String {
    pick(explicit, std::env::var(COBALT_API_ENV).ok(), DEFAULT_API_ENDPOINT)
}

/// Resolve the Cobalt web tool base URL.
pub fn resolve_cobalt_web() -> String {
    pick(None, std::env::var(COBALT_WEB_ENV).ok(), DEFAULT_WEB_TOOL)
}

/// Resolve the update manifest URL.
pub fn resolve_manifest_url() -> String {
    pick(None, std::env::var(MANIFEST_ENV).ok(), DEFAULT_MANIFEST_URL)
}

fn pick(explicit: Option<&str>, env: Option<String>, default: &str) -> String {
    explicit
        .map(str::to_string)
        .or(env.filter(|v| !v.is_empty()))
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_value_wins() {
        assert_eq!(
            pick(Some("http://flag"), Some("http://env".into()), "http://default"),
            "http://flag"
        );
        assert_eq!(
            resolve_settings_path(Some("/tmp/custom.json")),
            PathBuf::from("/tmp/custom.json")
        );
        assert_eq!(resolve_cobalt_endpoint(Some("http://local/api")), "http://local/api");
    }

    #[test]
    fn env_value_beats_default() {
        assert_eq!(pick(None, Some("http://env".into()), "http://default"), "http://env");
    }

    #[test]
    fn empty_env_falls_through() {
        assert_eq!(pick(None, Some(String::new()), "http://default"), "http://default");
        assert_eq!(pick(None, None, "http://default"), "http://default");
    }

    #[test]
    fn default_settings_file_name() {
        let path = default_settings_path();
        assert!(path.ends_with("yt-tools/settings.json"));
    }
}
