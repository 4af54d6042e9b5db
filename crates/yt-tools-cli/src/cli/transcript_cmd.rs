//! `yt-tools transcript <url>`: acquire a video's transcript.

use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{debug, warn};

use yt_tools::page::{self, VIDEO_TITLE_SELECTOR};
use yt_tools::{
    copy_with_fallback, AcquirerConfig, FetchRequest, HtmlPage, HttpClient, HttpFetch,
    Osc52Clipboard, PageDom, PlayerDataSource, SystemClipboard, Transcript, TranscriptAcquirer,
};

use crate::browser_page::BrowserPage;
use crate::cli::output;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;

const NAVIGATION_TIMEOUT_MS: u64 = 30_000;
const METADATA_WAIT: Duration = Duration::from_secs(10);

/// Options for one transcript run.
#[derive(Debug, Clone)]
pub struct TranscriptOptions {
    pub copy: bool,
    pub no_browser: bool,
    pub wait_ms: u64,
    /// How long a Linux clipboard copy is served before exiting.
    pub hold_secs: u64,
}

/// A transcript together with the title shown on its page.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub title: String,
    pub transcript: Transcript,
}

/// Run the transcript command.
pub async fn run(url: &str, opts: &TranscriptOptions) -> Result<()> {
    let http = HttpClient::new();
    let config = AcquirerConfig {
        panel_wait: Duration::from_millis(opts.wait_ms),
        ..AcquirerConfig::default()
    };

    let acquired = if opts.no_browser {
        acquire_static(url, &http, config).await?
    } else {
        match ChromiumRenderer::new().await {
            Ok(renderer) => {
                let result = acquire_in_browser(&renderer, url, &http, config).await;
                if let Err(e) = renderer.shutdown().await {
                    debug!("renderer shutdown failed: {e:#}");
                }
                result?
            }
            Err(e) => {
                warn!("{e:#}; reading the static page instead");
                acquire_static(url, &http, config).await?
            }
        }
    };

    report(&acquired, opts)
}

/// Acquire from the page as served, without running any of its scripts.
pub async fn acquire_static(
    url: &str,
    http: &dyn HttpFetch,
    config: AcquirerConfig,
) -> Result<Acquired> {
    let req = FetchRequest::get(url).header("Accept-Language", "en-US,en;q=0.9");
    let resp = http.fetch(req).await?;
    if !resp.is_ok() {
        bail!("Failed to load watch page: HTTP {}", resp.status);
    }

    let page = HtmlPage::new(url, resp.body);
    acquire(&page, &page, http, config).await
}

/// Acquire from a live tab, so the transcript panel can be opened.
pub async fn acquire_in_browser(
    renderer: &dyn Renderer,
    url: &str,
    http: &dyn HttpFetch,
    config: AcquirerConfig,
) -> Result<Acquired> {
    let mut ctx = renderer.new_context().await?;
    let nav = ctx.navigate(url, NAVIGATION_TIMEOUT_MS).await?;
    debug!(final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "watch page loaded");

    let page = BrowserPage::new(ctx);
    match page.wait_for_element(VIDEO_TITLE_SELECTOR, METADATA_WAIT).await {
        Ok(true) => {}
        Ok(false) => debug!("video title did not render in time"),
        Err(e) => debug!("could not watch for the video title: {e:#}"),
    }

    let result = acquire(&page, &page, http, config).await;
    if let Err(e) = page.close().await {
        debug!("closing tab failed: {e:#}");
    }
    result
}

async fn acquire(
    dom: &dyn PageDom,
    player: &dyn PlayerDataSource,
    http: &dyn HttpFetch,
    config: AcquirerConfig,
) -> Result<Acquired> {
    let transcript = TranscriptAcquirer::new(dom, player, http)
        .with_config(config)
        .acquire()
        .await?;
    let title = page::video_title(dom).await;
    debug!(%title, "video title");
    Ok(Acquired { title, transcript })
}

fn report(acquired: &Acquired, opts: &TranscriptOptions) -> Result<()> {
    let transcript = &acquired.transcript;
    let lines = transcript.line_count();
    let copy = opts.copy;

    if copy {
        let clipboard = SystemClipboard::holding_for(Duration::from_secs(opts.hold_secs));
        if cfg!(target_os = "linux") && opts.hold_secs > 0 {
            output::status(&format!(
                "Serving the clipboard for up to {}s; paste before it exits",
                opts.hold_secs
            ));
        }
        copy_with_fallback(&clipboard, &Osc52Clipboard::stderr(), &transcript.text)?;
    }

    if output::is_json() {
        let mut value = serde_json::json!({
            "video_id": transcript.video_id,
            "title": acquired.title,
            "source": transcript.source,
            "lines": lines,
            "copied": copy,
        });
        if !copy {
            value["text"] = serde_json::Value::String(transcript.text.clone());
        }
        output::print_json(&value);
    } else if copy {
        output::status(&format!("Copied {lines} lines to clipboard"));
    } else {
        output::status(&format!("{} ({})", acquired.title, transcript.source));
        println!("{}", transcript.text);
    }
    Ok(())
}
