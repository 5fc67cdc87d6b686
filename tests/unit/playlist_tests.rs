/*!
 * Tests for extended-M3U parsing and the entry model
 */

use anyhow::Result;
use m3u_curator::playlist::{PlaylistCollection, decode_text, parse_m3u};

use crate::common;

/// Every metadata line with a following non-comment URL line yields one entry
#[test]
fn test_parse_m3u_withMetadataAndUrlPairs_shouldYieldOneEntryEach() {
    let entries = parse_m3u(common::sample_playlist());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "CNN");
    assert_eq!(entries[0].url, "http://stream.example.com/cnn");
    assert_eq!(entries[1].name, "TSN [CA]");
    assert_eq!(entries[1].url, "http://stream.example.com/tsn");
}

/// Blank and comment lines between metadata and URL are skipped
#[test]
fn test_parse_m3u_withCommentsBeforeUrl_shouldSkipToFirstCandidate() {
    let text = "#EXTINF:-1,Channel\n\n#EXTVLCOPT:network-caching=1000\nhttp://host/stream\n";
    let entries = parse_m3u(text);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url, "http://host/stream");
}

/// A metadata line with no following candidate still yields an entry
#[test]
fn test_parse_m3u_withTrailingMetadataLine_shouldYieldEntryWithEmptyUrl() {
    let text = "#EXTINF:-1,Dangling\n# just a comment\n";
    let entries = parse_m3u(text);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Dangling");
    assert_eq!(entries[0].url, "");
}

/// A missing #EXTM3U header is tolerated
#[test]
fn test_parse_m3u_withoutHeader_shouldStillParse() {
    let text = "#EXTINF:-1,NoHeader\nhttp://host/a\n";
    assert_eq!(parse_m3u(text).len(), 1);
}

/// Non-entry noise never aborts the file
#[test]
fn test_parse_m3u_withMalformedFragments_shouldDropThemSilently() {
    let text = "garbage line\n#EXTINF:-1,Good\nhttp://host/good\nmore garbage\n";
    let entries = parse_m3u(text);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Good");
}

/// Recognized attributes are extracted case-insensitively, first match wins
#[test]
fn test_parse_m3u_withAttributes_shouldPopulateFields() {
    let entries = parse_m3u(common::sample_playlist());
    let cnn = &entries[0];
    assert_eq!(cnn.tvg_id.as_deref(), Some("cnn.us"));
    assert_eq!(cnn.tvg_name.as_deref(), Some("CNN"));
    assert_eq!(cnn.tvg_logo.as_deref(), Some("http://logos/cnn.png"));
    assert_eq!(cnn.group_title.as_deref(), Some("News"));
    // category mirrors group-title
    assert_eq!(cnn.category.as_deref(), Some("News"));

    let tsn = &entries[1];
    assert_eq!(tsn.country.as_deref(), Some("CA"));
    assert_eq!(tsn.language.as_deref(), Some("en"));
}

/// Alias keys fill country/language only when the canonical key is absent
#[test]
fn test_parse_m3u_withAliasKeys_shouldFillOnlyWhenCanonicalAbsent() {
    let text = concat!(
        "#EXTINF:-1 tvg-country=\"FR\" tvg-language=\"fr\",Alias Only\n",
        "http://host/a\n",
        "#EXTINF:-1 country=\"CA\" tvg-country=\"FR\",Canonical Wins\n",
        "http://host/b\n",
    );
    let entries = parse_m3u(text);
    assert_eq!(entries[0].country.as_deref(), Some("FR"));
    assert_eq!(entries[0].language.as_deref(), Some("fr"));
    assert_eq!(entries[1].country.as_deref(), Some("CA"));
}

/// Quality extraction is order-independent and dedup-stable
#[test]
fn test_parse_m3u_withRepeatedQualityTokens_shouldDedupAndSort() {
    let text = "#EXTINF:-1,Movie HEVC 1080 hevc\nhttp://host/movie\n";
    let entries = parse_m3u(text);
    assert_eq!(entries[0].quality.as_deref(), Some("1080/HEVC"));
}

/// Quality tokens only match as whole words
#[test]
fn test_parse_m3u_withEmbeddedQualityToken_shouldNotMatch() {
    let text = "#EXTINF:-1,Channel 1080p SHDTV\nhttp://host/x\n";
    let entries = parse_m3u(text);
    assert_eq!(entries[0].quality, None);
}

/// Name falls back to the URL basename, then to a placeholder
#[test]
fn test_parse_m3u_withoutTitle_shouldDeriveNameFromUrl() {
    let text = "#EXTINF:-1 tvg-id=\"x\"\nhttp://host/streams/sports.m3u8\n";
    let entries = parse_m3u(text);
    assert_eq!(entries[0].name, "sports");

    let text = "#EXTINF:-1 tvg-id=\"x\"\n";
    let entries = parse_m3u(text);
    assert_eq!(entries[0].name, "Unknown");
}

/// The title is everything after the last comma outside quotes
#[test]
fn test_parse_m3u_withCommaInsideQuotedAttribute_shouldKeepFullTitle() {
    let text = "#EXTINF:-1 group-title=\"News, Local\",Channel One\nhttp://host/one\n";
    let entries = parse_m3u(text);
    assert_eq!(entries[0].name, "Channel One");
    assert_eq!(entries[0].category.as_deref(), Some("News, Local"));
}

/// Annotation produces a copy, never mutates the original
#[test]
fn test_entry_rejected_shouldLeaveOriginalUntouched() {
    let original = common::entry("Channel", "http://host/a");
    let annotated = original.rejected("lang_filter").with_http_status(404);
    assert_eq!(original.reject_reason, None);
    assert_eq!(original.http_status, None);
    assert_eq!(annotated.reject_reason.as_deref(), Some("lang_filter"));
    assert_eq!(annotated.http_status, Some(404));
}

/// Non-UTF-8 bytes fall back to a permissive single-byte decode
#[test]
fn test_decode_text_withLatin1Bytes_shouldNotFail() {
    let bytes = b"#EXTINF:-1,T\xe9l\xe9 Qu\xe9bec\nhttp://host/tq\n";
    let text = decode_text(bytes);
    let entries = parse_m3u(&text);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Télé Québec");
}

/// Parsing a file from disk goes through the encoding fallback
#[test]
fn test_parse_file_withLatin1File_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("latin1.m3u");
    std::fs::write(&path, b"#EXTM3U\n#EXTINF:-1,Cha\xeene\nhttp://host/c\n")?;

    let playlist = PlaylistCollection::parse_file(&path)?;
    assert_eq!(playlist.source_file, path);
    assert_eq!(playlist.entries.len(), 1);
    assert_eq!(playlist.entries[0].name, "Chaîne");
    Ok(())
}
