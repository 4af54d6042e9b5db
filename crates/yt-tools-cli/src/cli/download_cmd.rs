//! `yt-tools download <url>`: get a download link from Cobalt.

use anyhow::{Context, Result};

use yt_tools::{DownloadKind, DownloadMode, Downloader, HttpClient, VideoQuality};

use crate::cli::output;
use crate::config;

/// Options for one download request.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub audio: bool,
    pub quality: VideoQuality,
    pub web: bool,
    pub open: bool,
    pub endpoint: Option<String>,
}

/// Run the download command.
pub async fn run(url: &str, opts: &DownloadOptions) -> Result<()> {
    let mode = if opts.web {
        DownloadMode::WebTool {
            base_url: config::resolve_cobalt_web(),
        }
    } else {
        DownloadMode::Api {
            endpoint: config::resolve_cobalt_endpoint(opts.endpoint.as_deref()),
        }
    };
    let kind = if opts.audio {
        DownloadKind::AudioOnly
    } else {
        DownloadKind::Video(opts.quality)
    };

    let http = HttpClient::new();
    let link = Downloader::new(&http, mode).download(url, kind).await?;

    if output::is_json() {
        output::print_json(&link);
    } else {
        output::status(if opts.audio {
            "Downloading audio..."
        } else {
            "Downloading video..."
        });
        println!("{}", link.url());
    }

    if opts.open {
        webbrowser::open(link.url())
            .with_context(|| format!("failed to open {}", link.url()))?;
    }
    Ok(())
}
