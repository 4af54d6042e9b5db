//! Hand the current video to the Cobalt media-download service.
//!
//! One implementation, two modes: POST to a Cobalt API instance and get a
//! direct link back, or build a link to the hosted Cobalt web tool with
//! the video URL pre-filled. Opening the link is left to the caller.
//!
//! API reference: <https://github.com/imputnet/cobalt/blob/current/docs/api.md>

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::fetch::{FetchRequest, HttpFetch};
use crate::types::{ToolsError, ToolsResult};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.cobalt.tools/api/json";
pub const DEFAULT_WEB_TOOL: &str = "https://cobalt.tools/";

/// Where downloads are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMode {
    /// POST to a Cobalt API instance.
    Api { endpoint: String },
    /// Open the hosted web tool with the URL pre-filled.
    WebTool { base_url: String },
}

impl Default for DownloadMode {
    fn default() -> Self {
        DownloadMode::Api {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
        }
    }
}

/// Requested video quality (`vQuality`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    #[default]
    Max,
    P2160,
    P1440,
    P1080,
    P720,
    P480,
    P360,
    P240,
    P144,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 9] = [
        VideoQuality::Max,
        VideoQuality::P2160,
        VideoQuality::P1440,
        VideoQuality::P1080,
        VideoQuality::P720,
        VideoQuality::P480,
        VideoQuality::P360,
        VideoQuality::P240,
        VideoQuality::P144,
    ];

    /// Value sent to the API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            VideoQuality::Max => "max",
            VideoQuality::P2160 => "2160",
            VideoQuality::P1440 => "1440",
            VideoQuality::P1080 => "1080",
            VideoQuality::P720 => "720",
            VideoQuality::P480 => "480",
            VideoQuality::P360 => "360",
            VideoQuality::P240 => "240",
            VideoQuality::P144 => "144",
        }
    }
}

impl std::str::FromStr for VideoQuality {
    type Err = String;

    /// Accepts `max`, `1080`, or `1080p` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.trim_end_matches('p');
        VideoQuality::ALL
            .into_iter()
            .find(|q| q.as_api_str() == normalized)
            .ok_or_else(|| format!("unknown quality {s:?}"))
    }
}

/// What to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// Video with audio. Cobalt has no video-only mode for YouTube.
    Video(VideoQuality),
    AudioOnly,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CobaltRequest<'a> {
    url: String,
    v_quality: &'a str,
    filename_pattern: &'a str,
    is_audio_only: bool,
    disable_metadata: bool,
}

#[derive(Debug, Default, Deserialize)]
struct CobaltResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    picker: Vec<PickerItem>,
}

#[derive(Debug, Default, Deserialize)]
struct PickerItem {
    #[serde(default)]
    url: Option<String>,
}

/// Where the user should go to get the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum DownloadLink {
    /// A direct link returned by the API.
    Direct(String),
    /// The first option of a multi-item picker response.
    Picker(String),
    /// The web tool, with the video pre-filled.
    WebTool(String),
}

impl DownloadLink {
    pub fn url(&self) -> &str {
        match self {
            DownloadLink::Direct(u) | DownloadLink::Picker(u) | DownloadLink::WebTool(u) => u,
        }
    }
}

/// Strip playlist and timestamp parameters from a watch URL.
pub fn clean_video_url(href: &str) -> String {
    let without_list = href.split("&list").next().unwrap_or(href);
    without_list
        .split("&t=")
        .next()
        .unwrap_or(without_list)
        .to_string()
}

/// Percent-encode a URL the way browsers' `encodeURI` does: reserved and
/// unreserved ASCII stay, every other byte of the UTF-8 form becomes `%XX`.
pub fn encode_uri(input: &str) -> String {
    const KEEP: &[u8] = b";,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || KEEP.contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Web tool link with the video URL in the fragment.
pub fn web_tool_url(base_url: &str, video_url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(video_url.as_bytes()).collect();
    format!("{}/#{}", base_url.trim_end_matches('/'), encoded)
}

/// Cobalt client bound to one mode.
pub struct Downloader<'a> {
    http: &'a dyn HttpFetch,
    mode: DownloadMode,
}

impl<'a> Downloader<'a> {
    pub fn new(http: &'a dyn HttpFetch, mode: DownloadMode) -> Self {
        Self { http, mode }
    }

    /// Produce a download link for the video at `page_url`.
    pub async fn download(&self, page_url: &str, kind: DownloadKind) -> ToolsResult<DownloadLink> {
        let video_url = clean_video_url(page_url);
        match &self.mode {
            DownloadMode::WebTool { base_url } => {
                Ok(DownloadLink::WebTool(web_tool_url(base_url, &video_url)))
            }
            DownloadMode::Api { endpoint } => self.request(endpoint, &video_url, kind).await,
        }
    }

    async fn request(&self, endpoint: &str, video_url: &str, kind: DownloadKind) -> ToolsResult<DownloadLink> {
        let (quality, is_audio_only) = match kind {
            DownloadKind::Video(q) => (q, false),
            DownloadKind::AudioOnly => (VideoQuality::Max, true),
        };
        let body = CobaltRequest {
            url: encode_uri(video_url),
            v_quality: quality.as_api_str(),
            filename_pattern: "basic",
            is_audio_only,
            disable_metadata: true,
        };
        debug!(?body, "Cobalt API request");

        let request = FetchRequest::post(endpoint, serde_json::to_string(&body)?)
            .header("Cache-Control", "no-cache")
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        let resp = self.http.fetch(request).await.map_err(|e| {
            error!("Cobalt API error: {e}");
            ToolsError::Network("Network error connecting to Cobalt".to_string())
        })?;

        let data: CobaltResponse = serde_json::from_str(&resp.body).map_err(|e| {
            error!("Failed to parse Cobalt response: {e}");
            ToolsError::Download("Failed to parse API response".to_string())
        })?;
        debug!(?data, "Cobalt API response");

        interpret(data)
    }
}

fn interpret(data: CobaltResponse) -> ToolsResult<DownloadLink> {
    if let Some(url) = data.url.filter(|u| !u.is_empty()) {
        return Ok(DownloadLink::Direct(url));
    }
    match data.status.as_deref() {
        Some("error") => Err(ToolsError::Download(
            data.text
                .unwrap_or_else(|| "Unknown error from Cobalt".to_string()),
        )),
        Some("picker") => data
            .picker
            .into_iter()
            .next()
            .and_then(|item| item.url)
            .map(DownloadLink::Picker)
            .ok_or_else(no_url),
        _ => Err(no_url()),
    }
}

fn no_url() -> ToolsError {
    ToolsError::Download("No download URL received".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpClient;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WATCH: &str = "https://www.youtube.com/watch?v=abc";

    #[test]
    fn test_clean_video_url() {
        assert_eq!(
            clean_video_url("https://www.youtube.com/watch?v=abc&list=PL1&index=2"),
            WATCH
        );
        assert_eq!(clean_video_url("https://www.youtube.com/watch?v=abc&t=42s"), WATCH);
        assert_eq!(clean_video_url(WATCH), WATCH);
    }

    #[test]
    fn test_web_tool_url() {
        assert_eq!(
            web_tool_url("https://cobalt.tools/", WATCH),
            "https://cobalt.tools/#https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc"
        );
    }

    #[test]
    fn test_encode_uri_matches_browser() {
        assert_eq!(encode_uri(WATCH), WATCH);
        assert_eq!(
            encode_uri("https://youtu.be/abc?si=a b&x=é#t=1"),
            "https://youtu.be/abc?si=a%20b&x=%C3%A9#t=1"
        );
        assert_eq!(encode_uri("50%"), "50%25");
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!("max".parse::<VideoQuality>().unwrap(), VideoQuality::Max);
        assert_eq!("1080p".parse::<VideoQuality>().unwrap(), VideoQuality::P1080);
        assert_eq!("720".parse::<VideoQuality>().unwrap(), VideoQuality::P720);
        assert!("999".parse::<VideoQuality>().is_err());
    }

    #[test]
    fn test_interpret_variants() {
        let direct = CobaltResponse {
            url: Some("https://dl/1".into()),
            ..Default::default()
        };
        assert_eq!(interpret(direct).unwrap(), DownloadLink::Direct("https://dl/1".into()));

        let err = CobaltResponse {
            status: Some("error".into()),
            text: Some("youtube is rate limiting".into()),
            ..Default::default()
        };
        assert_eq!(interpret(err).unwrap_err().to_string(), "youtube is rate limiting");

        let err = CobaltResponse {
            status: Some("error".into()),
            ..Default::default()
        };
        assert_eq!(interpret(err).unwrap_err().to_string(), "Unknown error from Cobalt");

        let picker = CobaltResponse {
            status: Some("picker".into()),
            picker: vec![PickerItem { url: Some("https://dl/a".into()) }, PickerItem { url: None }],
            ..Default::default()
        };
        assert_eq!(interpret(picker).unwrap(), DownloadLink::Picker("https://dl/a".into()));

        let empty_picker = CobaltResponse {
            status: Some("picker".into()),
            ..Default::default()
        };
        assert_eq!(interpret(empty_picker).unwrap_err().to_string(), "No download URL received");

        assert_eq!(
            interpret(CobaltResponse::default()).unwrap_err().to_string(),
            "No download URL received"
        );
    }

    #[tokio::test]
    async fn test_web_tool_mode_makes_no_request() {
        let client = HttpClient::new();
        let dl = Downloader::new(
            &client,
            DownloadMode::WebTool {
                base_url: DEFAULT_WEB_TOOL.to_string(),
            },
        );
        let link = dl
            .download("https://www.youtube.com/watch?v=abc&t=10", DownloadKind::AudioOnly)
            .await
            .unwrap();
        assert!(matches!(link, DownloadLink::WebTool(_)));
        assert!(link.url().ends_with("v%3Dabc"));
    }

    #[tokio::test]
    async fn test_api_mode_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("accept", "application/json"))
            .and(header("cache-control", "no-cache"))
            .and(body_json(serde_json::json!({
                "url": WATCH,
                "vQuality": "max",
                "filenamePattern": "basic",
                "isAudioOnly": true,
                "disableMetadata": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "stream", "url": "https://dl/audio"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let dl = Downloader::new(&client, DownloadMode::Api { endpoint: server.uri() });
        let link = dl
            .download("https://www.youtube.com/watch?v=abc&list=PL", DownloadKind::AudioOnly)
            .await
            .unwrap();
        assert_eq!(link, DownloadLink::Direct("https://dl/audio".into()));
    }

    #[tokio::test]
    async fn test_api_mode_posts_encoded_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "url": "https://www.youtube.com/watch?v=abc&feature=sh%20are",
                "vQuality": "720",
                "filenamePattern": "basic",
                "isAudioOnly": false,
                "disableMetadata": true
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"url": "https://dl/720"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let dl = Downloader::new(&client, DownloadMode::Api { endpoint: server.uri() });
        let link = dl
            .download(
                "https://www.youtube.com/watch?v=abc&feature=sh are",
                DownloadKind::Video(VideoQuality::P720),
            )
            .await
            .unwrap();
        assert_eq!(link.url(), "https://dl/720");
    }

    #[tokio::test]
    async fn test_api_mode_unparsable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let dl = Downloader::new(&client, DownloadMode::Api { endpoint: server.uri() });
        let err = dl
            .download(WATCH, DownloadKind::Video(VideoQuality::P720))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse API response");
    }

    #[tokio::test]
    async fn test_api_mode_network_error() {
        let client = HttpClient::new();
        let dl = Downloader::new(
            &client,
            DownloadMode::Api {
                endpoint: "http://127.0.0.1:1/api/json".to_string(),
            },
        );
        let err = dl.download(WATCH, DownloadKind::AudioOnly).await.unwrap_err();
        assert_eq!(err.to_string(), "Network error connecting to Cobalt");
    }
}
