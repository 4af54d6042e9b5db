//! YouTube Tools: transcript acquisition, caption parsing, and Cobalt downloads
//! for video watch pages.

pub mod acquirer;
pub mod captions;
pub mod clipboard;
pub mod download;
pub mod fetch;
pub mod html_page;
pub mod page;
pub mod settings;
pub mod types;
pub mod update;

pub use acquirer::{fetch_transcript, AcquirerConfig, TranscriptAcquirer, PANEL_MIN_CHARS, PANEL_WAIT};
pub use captions::{decode_entities, find_caption_tracks, parse_transcript_body, select_track};
pub use clipboard::{
    copy_with_fallback, ClipboardWriter, Osc52Clipboard, SystemClipboard, CLIPBOARD_HOLD,
};
pub use download::{DownloadKind, DownloadLink, DownloadMode, Downloader, VideoQuality};
pub use fetch::{FetchRequest, FetchResponse, HttpClient, HttpFetch, Method};
pub use html_page::HtmlPage;
pub use page::{NoPlayerData, PageDom, PlayerDataSource};
pub use settings::SettingsStore;
pub use types::*;
pub use update::{UpdateChecker, UpdateStatus};
