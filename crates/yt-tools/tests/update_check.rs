//! Update checks against a mock manifest, with settings bookkeeping on disk.

use chrono::{Duration, TimeZone, Utc};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use yt_tools::update::{LAST_CHECK_KEY, SKIPPED_VERSION_KEY};
use yt_tools::{HttpClient, SettingsStore, ToolsError, UpdateChecker, UpdateStatus};

const MANIFEST: &str = "// ==UserScript==\n// @name         YouTube Tools\n// @version      1.2.0\n// ==/UserScript==\n";

async fn manifest_server(body: &str, expected_hits: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_hits)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn newer_version_is_reported_and_check_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json"));
    let server = manifest_server(MANIFEST, 1).await;
    let http = HttpClient::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

    let checker = UpdateChecker::new(&http, &settings, server.uri(), "1.1.0");
    let status = checker.check(false, now).await.unwrap();

    assert_eq!(
        status,
        UpdateStatus::Available {
            current: "1.1.0".into(),
            latest: "1.2.0".into()
        }
    );
    let recorded: Option<chrono::DateTime<Utc>> = settings.get(LAST_CHECK_KEY, None);
    assert_eq!(recorded, Some(now));
}

#[tokio::test]
async fn recent_check_is_not_repeated() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json"));
    let server = manifest_server(MANIFEST, 0).await;
    let http = HttpClient::new();
    let last = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    settings.set(LAST_CHECK_KEY, &last);

    let checker = UpdateChecker::new(&http, &settings, server.uri(), "1.1.0");
    let status = checker.check(false, last + Duration::hours(3)).await.unwrap();
    assert_eq!(
        status,
        UpdateStatus::NotDue {
            next_check: last + Duration::hours(24)
        }
    );
}

#[tokio::test]
async fn force_ignores_interval() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json"));
    let server = manifest_server(r#"{"version": "1.1.0"}"#, 1).await;
    let http = HttpClient::new();
    let last = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    settings.set(LAST_CHECK_KEY, &last);

    let checker = UpdateChecker::new(&http, &settings, server.uri(), "1.1.0");
    let status = checker.check(true, last + Duration::minutes(1)).await.unwrap();
    assert!(matches!(status, UpdateStatus::UpToDate { .. }));
}

#[tokio::test]
async fn skipped_version_is_not_offered() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json"));
    let server = manifest_server(MANIFEST, 1).await;
    let http = HttpClient::new();

    let checker = UpdateChecker::new(&http, &settings, server.uri(), "1.1.0");
    checker.skip("1.2.0");
    assert_eq!(settings.get(SKIPPED_VERSION_KEY, String::new()), "1.2.0");

    let status = checker.check(true, Utc::now()).await.unwrap();
    assert!(matches!(status, UpdateStatus::Skipped { .. }));
}

#[tokio::test]
async fn manifest_without_version_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json"));
    let server = manifest_server("<html>moved</html>", 1).await;
    let http = HttpClient::new();

    let checker = UpdateChecker::new(&http, &settings, server.uri(), "1.1.0");
    let err = checker.check(true, Utc::now()).await.unwrap_err();
    assert!(matches!(err, ToolsError::Update(_)));
    let recorded: Option<chrono::DateTime<Utc>> = settings.get(LAST_CHECK_KEY, None);
    assert!(recorded.is_none());
}
