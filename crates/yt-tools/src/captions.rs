//! Caption track selection and the caption-body text scanner.
//!
//! The caption body served from a track's `baseUrl` is XML, but it is read
//! with a constrained pattern scan rather than an XML parser: only
//! `<text ...>cue</text>` elements are recognised and only a fixed entity
//! table is decoded. Anything outside that grammar is ignored.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::types::CaptionTrack;

fn text_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<text[^>]*>([^<]*)</text>").expect("valid regex"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").expect("valid regex"))
}

fn caption_tracks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""captionTracks":\s*(\[.*?\])"#).expect("valid regex"))
}

/// Pick the track to fetch: the first whose language code starts with `en`,
/// otherwise the first track. Input order is never changed.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code.starts_with("en"))
        .or_else(|| tracks.first())
}

/// Scan a caption body and return the cue texts joined by newlines.
///
/// Each segment is entity-decoded, has embedded newlines collapsed to
/// spaces and is trimmed; empty segments are dropped.
pub fn parse_transcript_body(body: &str) -> String {
    text_segment_re()
        .captures_iter(body)
        .filter_map(|cap| {
            let raw = cap.get(1)?.as_str();
            let line = decode_entities(raw).replace('\n', " ");
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode the fixed entity table plus numeric character references.
///
/// `&amp;` is decoded first over the whole segment, then the remaining
/// entities in one pass over that result. Caption bodies arrive double
/// escaped (`&amp;#39;`), so both layers come off. `&amp;amp;` yields
/// `&amp;`. Unknown named entities and invalid code points are left as
/// written.
pub fn decode_entities(text: &str) -> String {
    let unescaped = text.replace("&amp;", "&");
    entity_re()
        .replace_all(&unescaped, |cap: &Captures| {
            let whole = &cap[0];
            let name = &cap[1];
            match name {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => decode_numeric(name).unwrap_or_else(|| whole.to_string()),
            }
        })
        .into_owned()
}

fn decode_numeric(reference: &str) -> Option<String> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(String::from)
}

/// Find the first `"captionTracks": [...]` fragment in a script and parse it.
///
/// Returns `None` when the script has no fragment; a fragment that is not
/// a valid track list is an error.
pub fn find_caption_tracks(script: &str) -> Option<serde_json::Result<Vec<CaptionTrack>>> {
    if !script.contains("captionTracks") {
        return None;
    }
    let fragment = caption_tracks_re().captures(script)?.get(1)?.as_str();
    Some(serde_json::from_str(fragment))
}
