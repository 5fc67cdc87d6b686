use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use url::Url;

// @module: M3U playlist parsing and the channel entry model

// @const: File header marker, tolerated but not required
pub const M3U_HEADER: &str = "#EXTM3U";

// @const: Metadata line marker
pub const EXTINF: &str = "#EXTINF";

/// Resolution/codec vocabulary recognized as quality tags on a metadata line.
const QUALITY_TAGS: [&str; 9] = [
    "UHD", "4K", "1080", "720", "HD", "FHD", "SD", "HEVC", "H265",
];

/// Quoted attribute keys recognized on an `#EXTINF` line. The `tvg-country`
/// and `tvg-language` aliases only fill the canonical field when the
/// canonical key is absent.
const ATTR_TVG_ID: &str = "tvg-id";
const ATTR_TVG_NAME: &str = "tvg-name";
const ATTR_TVG_LOGO: &str = "tvg-logo";
const ATTR_GROUP_TITLE: &str = "group-title";
const ATTR_COUNTRY: &str = "country";
const ATTR_LANGUAGE: &str = "language";
const ATTR_TVG_COUNTRY: &str = "tvg-country";
const ATTR_TVG_LANGUAGE: &str = "tvg-language";

/// One channel record extracted from a playlist file.
///
/// An entry is created by the parser and then annotated, never mutated in
/// place: filtering and validation return a fresh copy carrying the
/// `reject_reason` (and `http_status` where a probe was attempted), so the
/// original record stays available for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// Display title; never empty (falls back to a derived value)
    pub name: String,

    /// Stream URI; may be empty when the metadata line had no URL line
    pub url: String,

    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
    pub tvg_logo: Option<String>,

    /// `group-title` attribute verbatim
    pub group_title: Option<String>,

    /// Mirrors `group_title` when present
    pub category: Option<String>,

    pub country: Option<String>,
    pub language: Option<String>,

    /// Derived resolution/codec tags, e.g. "1080/HEVC"
    pub quality: Option<String>,

    /// Set exactly once, when the entry is excluded
    pub reject_reason: Option<String>,

    /// Set only after a validation attempt; 0 means no HTTP response
    pub http_status: Option<u16>,
}

impl Entry {
    /// Annotated copy carrying a rejection reason.
    pub fn rejected(&self, reason: &str) -> Entry {
        let mut copy = self.clone();
        copy.reject_reason = Some(reason.to_string());
        copy
    }

    /// Annotated copy carrying the HTTP status observed during validation.
    pub fn with_http_status(&self, status: u16) -> Entry {
        let mut copy = self.clone();
        copy.http_status = Some(status);
        copy
    }
}

/// Entries parsed out of a single playlist file.
#[derive(Debug)]
pub struct PlaylistCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Entries in file order
    pub entries: Vec<Entry>,
}

impl PlaylistCollection {
    /// Parse a playlist file from disk, tolerating non-UTF-8 content.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = read_playlist_text(path)?;
        let entries = parse_m3u(&text);
        Ok(PlaylistCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }
}

/// Read a playlist file as text. Sources in the wild are frequently
/// mis-encoded; when the bytes are not valid UTF-8, fall back to a
/// permissive Latin-1 decode instead of failing the file.
pub fn read_playlist_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = fs::read(path.as_ref())?;
    Ok(decode_text(&bytes))
}

/// UTF-8 with Latin-1 fallback; total, never errors.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Extract the ordered entry sequence from playlist text.
///
/// A metadata line is any line starting with `#EXTINF`; its URL is the next
/// non-empty line that is not itself a comment. Blank and comment lines in
/// between are skipped. A metadata line with no qualifying line before
/// end-of-file still yields an entry, with an empty URL. A missing
/// `#EXTM3U` header is not an error.
pub fn parse_m3u(text: &str) -> Vec<Entry> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if !line.starts_with(EXTINF) {
            i += 1;
            continue;
        }

        // Next non-empty, non-comment line is the stream URL.
        let mut j = i + 1;
        let mut url = "";
        while j < lines.len() {
            let cand = lines[j].trim();
            j += 1;
            if !cand.is_empty() && !cand.starts_with('#') {
                url = cand;
                break;
            }
        }

        let mut entry = extract_metadata(line);
        entry.url = url.to_string();
        if entry.name.is_empty() {
            entry.name = derive_name(line, url);
        }
        entries.push(entry);
        i = j;
    }

    entries
}

/// Pull the recognized quoted attributes, the trailing title, and the
/// quality tags out of one `#EXTINF` metadata line.
pub fn extract_metadata(extinf_line: &str) -> Entry {
    let mut entry = Entry {
        tvg_id: extract_attr(extinf_line, ATTR_TVG_ID),
        tvg_name: extract_attr(extinf_line, ATTR_TVG_NAME),
        tvg_logo: extract_attr(extinf_line, ATTR_TVG_LOGO),
        group_title: extract_attr(extinf_line, ATTR_GROUP_TITLE),
        country: extract_attr(extinf_line, ATTR_COUNTRY),
        language: extract_attr(extinf_line, ATTR_LANGUAGE),
        ..Entry::default()
    };

    if let Some(title) = title_after_last_comma(extinf_line) {
        entry.name = title.to_string();
    }

    entry.quality = extract_quality(extinf_line);

    // Alias keys fill the canonical field only when it was not found.
    if entry.country.is_none() {
        entry.country = extract_attr(extinf_line, ATTR_TVG_COUNTRY);
    }
    if entry.language.is_none() {
        entry.language = extract_attr(extinf_line, ATTR_TVG_LANGUAGE);
    }

    entry.category = entry.group_title.clone();

    entry
}

/// Extract the quoted value of `key="..."`, case-insensitively on the key.
/// First match wins; absent or unterminated attributes yield `None`. The
/// match runs on the line as-is, so indices stay valid for any input;
/// lowercasing a copy would shift byte offsets on characters whose case
/// pair differs in UTF-8 length.
fn extract_attr(line: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?i){}="([^"]*)""#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(line)?.get(1)?.as_str().trim();
    Some(value.to_string())
}

/// The free-text title: everything after the last comma that sits outside
/// quoted attribute values. `None` when no such comma exists.
fn title_after_last_comma(line: &str) -> Option<&str> {
    let mut in_quotes = false;
    let mut last_comma = None;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last_comma = Some(idx),
            _ => {}
        }
    }
    let idx = last_comma?;
    let title = line[idx + 1..].trim();
    if title.is_empty() { None } else { Some(title) }
}

/// Scan the metadata line for the quality vocabulary as whole words,
/// case-insensitively. Matches are uppercased, deduplicated, sorted and
/// joined with `/`.
fn extract_quality(line: &str) -> Option<String> {
    let mut found: Vec<String> = QUALITY_TAGS
        .iter()
        .filter(|tag| contains_word_ci(line, tag))
        .map(|tag| tag.to_uppercase())
        .collect();
    if found.is_empty() {
        return None;
    }
    found.sort();
    found.dedup();
    Some(found.join("/"))
}

/// Whole-word, case-insensitive containment. A word boundary is anything
/// that is not alphanumeric or underscore.
fn contains_word_ci(haystack: &str, word: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let word = word.to_lowercase();
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(&word) {
        let start = from + pos;
        let end = start + word.len();
        let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Fallback display name for an entry whose metadata line carried no title:
/// the title-suffix rule again, then the extension-stripped basename of the
/// URL path, then a literal placeholder.
fn derive_name(extinf_line: &str, url: &str) -> String {
    if let Some(title) = title_after_last_comma(extinf_line) {
        return title.to_string();
    }

    if let Ok(parsed) = Url::parse(url) {
        let base = parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or("");
        let stem = match base.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => base,
        };
        if !stem.is_empty() {
            return stem.to_string();
        }
    }

    "Unknown".to_string()
}
