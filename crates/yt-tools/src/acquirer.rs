//! Transcript acquisition with ordered fallback strategies.
//!
//! Strategies run in a fixed order and the first non-empty text wins:
//!
//! 1. Panel scrape: read the rendered transcript panel, opening it first
//!    if a "show transcript" control exists.
//! 2. Player data: fetch the caption track listed in the player response.
//! 3. Script scrape: fetch a caption track found in an inline script.
//!
//! Each strategy is attempted once. Failures inside a strategy are logged
//! and treated as "no result"; only a missing video id or the exhaustion
//! of every strategy reaches the caller.

use std::time::Duration;

use tracing::{debug, info};

use crate::captions::{find_caption_tracks, parse_transcript_body, select_track};
use crate::fetch::{FetchRequest, HttpFetch};
use crate::page::{self, PageDom, PlayerDataSource, SHOW_TRANSCRIPT_SELECTOR, TRANSCRIPT_PANEL_SELECTOR};
use crate::types::{CaptionTrack, StrategyKind, ToolsError, ToolsResult, Transcript};

/// How long to wait after activating the "show transcript" control.
pub const PANEL_WAIT: Duration = Duration::from_millis(2000);

/// Panel text must be longer than this (after trimming) to count as loaded.
pub const PANEL_MIN_CHARS: usize = 50;

/// Strategy order and panel timing.
#[derive(Debug, Clone)]
pub struct AcquirerConfig {
    pub strategies: Vec<StrategyKind>,
    pub panel_wait: Duration,
    pub panel_min_chars: usize,
}

impl Default for AcquirerConfig {
    fn default() -> Self {
        Self {
            strategies: vec![
                StrategyKind::PanelScrape,
                StrategyKind::PlayerData,
                StrategyKind::ScriptScrape,
            ],
            panel_wait: PANEL_WAIT,
            panel_min_chars: PANEL_MIN_CHARS,
        }
    }
}

/// Produces a transcript for the video on the current page.
pub struct TranscriptAcquirer<'a> {
    dom: &'a dyn PageDom,
    player: &'a dyn PlayerDataSource,
    http: &'a dyn HttpFetch,
    config: AcquirerConfig,
}

impl<'a> TranscriptAcquirer<'a> {
    pub fn new(dom: &'a dyn PageDom, player: &'a dyn PlayerDataSource, http: &'a dyn HttpFetch) -> Self {
        Self {
            dom,
            player,
            http,
            config: AcquirerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AcquirerConfig) -> Self {
        self.config = config;
        self
    }

    /// Acquire the transcript, trying each strategy once in order.
    pub async fn acquire(&self) -> ToolsResult<Transcript> {
        let video_id = page::video_id(self.dom).await.ok_or(ToolsError::NoVideoId)?;

        for &kind in &self.config.strategies {
            let text = match kind {
                StrategyKind::PanelScrape => self.scrape_panel().await,
                StrategyKind::PlayerData => self.from_player_data().await,
                StrategyKind::ScriptScrape => self.from_scripts().await,
            };
            match text {
                Some(text) if !text.trim().is_empty() => {
                    info!(video = %video_id, strategy = %kind, "transcript acquired");
                    return Ok(Transcript {
                        video_id,
                        source: kind,
                        text,
                    });
                }
                _ => debug!(strategy = %kind, "no transcript from strategy"),
            }
        }

        Err(ToolsError::TranscriptUnavailable)
    }

    async fn panel_text(&self) -> Option<String> {
        match self.dom.text_of(TRANSCRIPT_PANEL_SELECTOR).await {
            Ok(text) => text,
            Err(e) => {
                debug!("transcript panel read failed: {e:#}");
                None
            }
        }
    }

    fn is_loaded(&self, text: &str) -> bool {
        text.trim().chars().count() > self.config.panel_min_chars
    }

    async fn scrape_panel(&self) -> Option<String> {
        if let Some(text) = self.panel_text().await {
            if self.is_loaded(&text) {
                debug!("transcript panel already open");
                return Some(text);
            }
        }

        let clicked = match self.dom.click(SHOW_TRANSCRIPT_SELECTOR).await {
            Ok(found) => found,
            Err(e) => {
                debug!("show-transcript click failed: {e:#}");
                false
            }
        };
        if clicked {
            debug!("clicked show transcript, waiting {:?}", self.config.panel_wait);
            tokio::time::sleep(self.config.panel_wait).await;

            if let Some(text) = self.panel_text().await {
                if self.is_loaded(&text) {
                    return Some(text);
                }
            }
        }

        self.panel_text().await.filter(|t| !t.trim().is_empty())
    }

    async fn from_player_data(&self) -> Option<String> {
        let resp = match self.player.player_response().await {
            Ok(Some(resp)) => resp,
            Ok(None) => return None,
            Err(e) => {
                debug!("player data unreadable: {e:#}");
                return None;
            }
        };
        self.fetch_selected(resp.caption_tracks()).await
    }

    async fn from_scripts(&self) -> Option<String> {
        let scripts = match self.dom.inline_scripts().await {
            Ok(scripts) => scripts,
            Err(e) => {
                debug!("inline scripts unreadable: {e:#}");
                return None;
            }
        };

        for script in &scripts {
            match find_caption_tracks(script) {
                None => continue,
                Some(Err(e)) => debug!("failed to parse caption tracks: {e}"),
                Some(Ok(tracks)) => {
                    if let Some(text) = self.fetch_selected(&tracks).await {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    async fn fetch_selected(&self, tracks: &[CaptionTrack]) -> Option<String> {
        let track = select_track(tracks)?;
        if track.base_url.is_empty() {
            return None;
        }

        match fetch_transcript(self.http, &track.base_url).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                debug!(lang = %track.language_code, "failed to fetch caption track: {e}");
                None
            }
        }
    }
}

/// Fetch a caption track and scan its body.
///
/// Any status other than 200 is an error; transport failures are
/// reported as network errors.
pub async fn fetch_transcript(http: &dyn HttpFetch, url: &str) -> ToolsResult<String> {
    let resp = http
        .fetch(FetchRequest::get(url))
        .await
        .map_err(|_| ToolsError::Network("Network error fetching transcript".to_string()))?;
    if !resp.is_ok() {
        return Err(ToolsError::Network(format!(
            "Failed to fetch transcript: {}",
            resp.status
        )));
    }
    Ok(parse_transcript_body(&resp.body))
}
