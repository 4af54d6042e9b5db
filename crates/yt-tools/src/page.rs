//! Page capabilities consumed by the transcript acquirer.
//!
//! `PageDom` abstracts over whatever is showing the watch page (a live
//! browser tab, or a static HTML snapshot). `PlayerDataSource` is the
//! read-only view of the page's player-response global, injected
//! separately so the acquirer never touches host globals directly.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{PlayerResponse, VideoId};

/// The engagement panel that renders the full transcript once opened.
pub const TRANSCRIPT_PANEL_SELECTOR: &str =
    r#"ytd-engagement-panel-section-list-renderer[target-id="engagement-panel-searchable-transcript"]"#;

/// Controls that open the transcript panel, tried as one selector list.
pub const SHOW_TRANSCRIPT_SELECTOR: &str = concat!(
    "#primary-button > ytd-button-renderer > yt-button-shape > button, ",
    r#"button[aria-label="Show transcript"], "#,
    "ytd-button-renderer:has(yt-formatted-string) button"
);

/// Heading that carries the video title on both watch-page layouts.
pub const VIDEO_TITLE_SELECTOR: &str =
    "h1.ytd-video-primary-info-renderer yt-formatted-string, h1.ytd-watch-metadata yt-formatted-string";

/// DOM inspection and interaction on the current page.
#[async_trait]
pub trait PageDom: Send + Sync {
    /// URL of the current page.
    async fn current_url(&self) -> Result<String>;
    /// Rendered text of the first element matching `selector`, if any.
    async fn text_of(&self, selector: &str) -> Result<Option<String>>;
    /// Activate the first element matching `selector`. Returns whether one was found.
    async fn click(&self, selector: &str) -> Result<bool>;
    /// Text content of every inline script, in document order.
    async fn inline_scripts(&self) -> Result<Vec<String>>;
}

/// Read-only access to the page's initial player response.
#[async_trait]
pub trait PlayerDataSource: Send + Sync {
    /// The player response, or `None` when the page does not expose one.
    async fn player_response(&self) -> Result<Option<PlayerResponse>>;
}

/// A provider that never has player data.
pub struct NoPlayerData;

#[async_trait]
impl PlayerDataSource for NoPlayerData {
    async fn player_response(&self) -> Result<Option<PlayerResponse>> {
        Ok(None)
    }
}

/// Resolve the video id of the current page.
pub async fn video_id(dom: &dyn PageDom) -> Option<VideoId> {
    match dom.current_url().await {
        Ok(url) => VideoId::from_url(&url),
        Err(e) => {
            tracing::debug!("could not read page URL: {e:#}");
            None
        }
    }
}

/// Whether the page is a watch page with a video id.
pub async fn is_video_page(dom: &dyn PageDom) -> bool {
    let Ok(url) = dom.current_url().await else {
        return false;
    };
    let is_watch = url::Url::parse(&url)
        .map(|u| u.path() == "/watch")
        .unwrap_or(false);
    is_watch && VideoId::from_url(&url).is_some()
}

/// Title of the video, or `"Unknown Video"`.
pub async fn video_title(dom: &dyn PageDom) -> String {
    match dom.text_of(VIDEO_TITLE_SELECTOR).await {
        Ok(Some(title)) if !title.trim().is_empty() => title.trim().to_string(),
        _ => "Unknown Video".to_string(),
    }
}
