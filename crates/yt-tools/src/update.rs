//! Check a remote manifest for a newer release.
//!
//! The manifest is either a userscript header carrying `// @version x.y.z`
//! or a JSON object with a `version` field. Checks are rate-limited through
//! the settings store, and a version the user chose to skip is not offered
//! again.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::fetch::{FetchRequest, HttpFetch};
use crate::settings::SettingsStore;
use crate::types::{ToolsError, ToolsResult};

pub const LAST_CHECK_KEY: &str = "lastUpdateCheck";
pub const SKIPPED_VERSION_KEY: &str = "skippedVersion";

/// Minimum time between automatic checks.
pub fn check_interval() -> Duration {
    Duration::hours(24)
}

/// Outcome of an update check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    /// A newer version is available.
    Available { current: String, latest: String },
    /// Running the latest version (or newer).
    UpToDate { current: String, latest: String },
    /// The newer version was skipped by the user.
    Skipped { current: String, latest: String },
    /// Checked too recently; nothing fetched.
    NotDue { next_check: DateTime<Utc> },
}

/// A release version. Orders by the numeric core, then a stable release
/// above any prerelease of the same core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub stable: bool,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            stable: true,
        }
    }
}

/// Parse a version leniently: `v1.2` and `1.2` both become `1.2.0`.
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches('v');
    let (core, stable) = match trimmed.find(['-', '+']) {
        Some(i) => (&trimmed[..i], trimmed.as_bytes()[i] == b'+'),
        None => (trimmed, true),
    };
    let parts = core
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let at = |i: usize| parts.get(i).copied().unwrap_or(0);
    Some(Version {
        major: at(0),
        minor: at(1),
        patch: at(2),
        stable,
    })
}

/// Whether `latest` is strictly newer than `current`.
pub fn is_newer_version(current: &str, latest: &str) -> bool {
    match (parse_version(current), parse_version(latest)) {
        (Some(c), Some(l)) => l > c,
        _ => false,
    }
}

/// Pull the version out of a manifest body.
pub fn manifest_version(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        return json
            .get("version")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string());
    }
    body.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("//")?.trim_start();
        let value = rest.strip_prefix("@version")?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Compares the running version with a remote manifest.
pub struct UpdateChecker<'a> {
    http: &'a dyn HttpFetch,
    settings: &'a SettingsStore,
    manifest_url: String,
    current: String,
}

impl<'a> UpdateChecker<'a> {
    pub fn new(
        http: &'a dyn HttpFetch,
        settings: &'a SettingsStore,
        manifest_url: impl Into<String>,
        current: impl Into<String>,
    ) -> Self {
        Self {
            http,
            settings,
            manifest_url: manifest_url.into(),
            current: current.into(),
        }
    }

    /// Check for an update. Without `force`, at most once per interval.
    pub async fn check(&self, force: bool, now: DateTime<Utc>) -> ToolsResult<UpdateStatus> {
        if !force {
            let last: Option<DateTime<Utc>> = self.settings.get(LAST_CHECK_KEY, None);
            if let Some(last) = last {
                let next_check = last + check_interval();
                if now < next_check {
                    return Ok(UpdateStatus::NotDue { next_check });
                }
            }
        }

        let resp = self
            .http
            .fetch(FetchRequest::get(&self.manifest_url))
            .await?;
        if !resp.is_ok() {
            return Err(ToolsError::Update(format!("manifest returned {}", resp.status)));
        }
        let latest = manifest_version(&resp.body)
            .ok_or_else(|| ToolsError::Update("manifest has no version".to_string()))?;
        self.settings.set(LAST_CHECK_KEY, &now);

        let current = self.current.clone();
        if !is_newer_version(&current, &latest) {
            return Ok(UpdateStatus::UpToDate { current, latest });
        }
        let skipped: Option<String> = self.settings.get(SKIPPED_VERSION_KEY, None);
        if skipped.as_deref() == Some(latest.as_str()) {
            return Ok(UpdateStatus::Skipped { current, latest });
        }
        Ok(UpdateStatus::Available { current, latest })
    }

    /// Stop offering `version`.
    pub fn skip(&self, version: &str) {
        self.settings.set(SKIPPED_VERSION_KEY, &version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version("1.1").unwrap(), Version::new(1, 1, 0));
        assert_eq!(parse_version("v2").unwrap(), Version::new(2, 0, 0));
        assert_eq!(parse_version("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert!(parse_version("1.2-beta.1").unwrap() < Version::new(1, 2, 0));
        assert!(parse_version("banana").is_none());
        assert!(parse_version("1.2.3.4").is_none());
        assert!(parse_version("").is_none());
    }

    #[test]
    fn test_is_newer_version() {
        assert!(is_newer_version("1.1.0", "1.2.0"));
        assert!(is_newer_version("1.1.0", "1.10"));
        assert!(is_newer_version("1.1.0-beta.1", "1.1.0"));
        assert!(!is_newer_version("1.1.0", "1.1"));
        assert!(!is_newer_version("1.2.0", "1.1.9"));
        assert!(!is_newer_version("1.1.0", "garbage"));
    }

    #[test]
    fn test_manifest_version_userscript() {
        let body = "// ==UserScript==\n// @name         YouTube Tools\n// @version      1.3.0\n// ==/UserScript==\n";
        assert_eq!(manifest_version(body).as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_manifest_version_json() {
        assert_eq!(manifest_version(r#"{"version":" 2.0.1 "}"#).as_deref(), Some("2.0.1"));
        assert!(manifest_version(r#"{"name":"x"}"#).is_none());
        assert!(manifest_version("no header").is_none());
    }
}
