//! Core data types for videos, caption tracks, and transcripts.

use serde::{Deserialize, Serialize};

/// Identifier of the video shown on the current page (the `v` query parameter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Wrap a raw identifier. Empty strings are not identifiers.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Extract the video id from a page URL's query string.
    pub fn from_url(page_url: &str) -> Option<Self> {
        let parsed = url::Url::parse(page_url).ok()?;
        parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .and_then(|(_, v)| Self::new(v.into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One caption stream offered by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub base_url: String,
}

/// The subset of the host page's initial player response that carries captions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    #[serde(default)]
    pub captions: Option<PlayerCaptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCaptions {
    #[serde(default)]
    pub player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTracklist {
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

impl PlayerResponse {
    /// Caption tracks in page order, or an empty slice when any level is missing.
    pub fn caption_tracks(&self) -> &[CaptionTrack] {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|r| r.caption_tracks.as_slice())
            .unwrap_or(&[])
    }
}

/// Which acquisition strategy produced a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Text read from the rendered transcript panel.
    PanelScrape,
    /// Caption track listed in the player-response global.
    PlayerData,
    /// Caption track found in an inline script.
    ScriptScrape,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StrategyKind::PanelScrape => "panel scrape",
            StrategyKind::PlayerData => "player data",
            StrategyKind::ScriptScrape => "script scrape",
        };
        f.write_str(name)
    }
}

/// Transcript text acquired for one video. No timing information is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,
    pub source: StrategyKind,
    pub text: String,
}

impl Transcript {
    /// Number of newline-separated lines in the text.
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Errors that can occur in YouTube Tools.
#[derive(thiserror::Error, Debug)]
pub enum ToolsError {
    #[error("No video ID found")]
    NoVideoId,

    #[error("Transcript not available for this video")]
    TranscriptUnavailable,

    #[error("{0}")]
    Network(String),

    #[error("Failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error("{0}")]
    Download(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Update check failed: {0}")]
    Update(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type ToolsResult<T> = Result<T, ToolsError>;
