//! A watch page captured as static HTML.
//!
//! Implements the page capabilities over a document fetched without a
//! browser. Nothing can be clicked, so the transcript panel only shows up
//! if it was already rendered into the snapshot. Player data is recovered
//! from the inline script that assigns `ytInitialPlayerResponse`.

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::page::{PageDom, PlayerDataSource};
use crate::types::PlayerResponse;

const PLAYER_RESPONSE_VAR: &str = "ytInitialPlayerResponse";

/// Static HTML snapshot of a page at a known URL.
pub struct HtmlPage {
    url: String,
    html: String,
}

impl HtmlPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    fn scripts(&self) -> Vec<String> {
        let document = Html::parse_document(&self.html);
        let Ok(sel) = Selector::parse("script:not([src])") else {
            return Vec::new();
        };
        document
            .select(&sel)
            .map(|el| el.text().collect::<String>())
            .collect()
    }
}

#[async_trait]
impl PageDom for HtmlPage {
    async fn current_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn text_of(&self, selector: &str) -> Result<Option<String>> {
        let sel = Selector::parse(selector)
            .map_err(|e| anyhow::anyhow!("unsupported selector {selector:?}: {e}"))?;
        let document = Html::parse_document(&self.html);
        Ok(document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join("")))
    }

    async fn click(&self, _selector: &str) -> Result<bool> {
        Ok(false)
    }

    async fn inline_scripts(&self) -> Result<Vec<String>> {
        Ok(self.scripts())
    }
}

#[async_trait]
impl PlayerDataSource for HtmlPage {
    async fn player_response(&self) -> Result<Option<PlayerResponse>> {
        for script in self.scripts() {
            if let Some(json) = extract_assigned_object(&script, PLAYER_RESPONSE_VAR) {
                let resp: PlayerResponse = serde_json::from_str(json)?;
                return Ok(Some(resp));
            }
        }
        Ok(None)
    }
}

/// Find `name = {...}` in a script and return the balanced object literal.
///
/// Braces inside string literals are skipped. Returns `None` when the
/// assignment is absent or the object is unterminated.
pub fn extract_assigned_object<'a>(script: &'a str, name: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(pos) = script[search_from..].find(name) {
        let after = search_from + pos + name.len();
        let rest = script[after..].trim_start();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim_start();
            if value.starts_with('{') {
                let start = script.len() - value.len();
                return balanced_object_end(&script[start..]).map(|end| &script[start..start + end]);
            }
        }
        search_from = after;
    }
    None
}

fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{self, TRANSCRIPT_PANEL_SELECTOR};

    const WATCH_URL: &str = "https://www.youtube.com/watch?v=abc123";

    #[test]
    fn test_extract_assigned_object() {
        let script = r#"var ytInitialPlayerResponse = {"a":{"b":"}"}}; var other = 1;"#;
        assert_eq!(
            extract_assigned_object(script, "ytInitialPlayerResponse"),
            Some(r#"{"a":{"b":"}"}}"#)
        );
    }

    #[test]
    fn test_extract_skips_non_assignment_mentions() {
        let script = r#"if (window.ytInitialPlayerResponse) {} window.ytInitialPlayerResponse={"x":1};"#;
        assert_eq!(
            extract_assigned_object(script, "ytInitialPlayerResponse"),
            Some(r#"{"x":1}"#)
        );
    }

    #[test]
    fn test_extract_unterminated() {
        assert!(extract_assigned_object("ytInitialPlayerResponse = {\"a\":", "ytInitialPlayerResponse").is_none());
        assert!(extract_assigned_object("nothing here", "ytInitialPlayerResponse").is_none());
    }

    #[tokio::test]
    async fn test_player_response_from_script() {
        let html = r#"<html><body><script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://c/t","languageCode":"en"}]}}};</script></body></html>"#;
        let page = HtmlPage::new(WATCH_URL, html);
        let resp = page.player_response().await.unwrap().unwrap();
        assert_eq!(resp.caption_tracks()[0].base_url, "https://c/t");
    }

    #[tokio::test]
    async fn test_no_player_response() {
        let page = HtmlPage::new(WATCH_URL, "<html><script>var a = 1;</script></html>");
        assert!(page.player_response().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inline_scripts_skip_external() {
        let html = r#"<script src="/player.js"></script><script>one()</script><script>two()</script>"#;
        let page = HtmlPage::new(WATCH_URL, html);
        assert_eq!(page.inline_scripts().await.unwrap(), vec!["one()", "two()"]);
    }

    #[tokio::test]
    async fn test_text_of_panel_and_title() {
        let html = r#"<html><body>
            <h1 class="ytd-watch-metadata"><yt-formatted-string>  My Video </yt-formatted-string></h1>
            <ytd-engagement-panel-section-list-renderer target-id="engagement-panel-searchable-transcript">cue one</ytd-engagement-panel-section-list-renderer>
        </body></html>"#;
        let page = HtmlPage::new(WATCH_URL, html);
        assert_eq!(
            page.text_of(TRANSCRIPT_PANEL_SELECTOR).await.unwrap().as_deref(),
            Some("cue one")
        );
        assert_eq!(page::video_title(&page).await, "My Video");
        assert!(page::is_video_page(&page).await);
    }

    #[tokio::test]
    async fn test_missing_element_and_click() {
        let page = HtmlPage::new("https://www.youtube.com/", "<html></html>");
        assert!(page.text_of(TRANSCRIPT_PANEL_SELECTOR).await.unwrap().is_none());
        assert!(!page.click("button").await.unwrap());
        assert_eq!(page::video_title(&page).await, "Unknown Video");
        assert!(page::video_id(&page).await.is_none());
    }
}
