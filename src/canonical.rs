use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::playlist::Entry;

// @module: Canonical dedup key and export-time display-name cleanup

// @const: Internal whitespace runs
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Delimiter joining the five normalized key segments.
const KEY_DELIMITER: &str = "|";

/// Composite identity used to collapse apparent duplicates: normalized
/// name, URL host, category, language, country, joined in that order.
///
/// Empty fields participate as empty segments rather than being omitted,
/// so two entries that differ only in an otherwise-empty axis stay
/// distinct. An unparseable URL contributes an empty host, never an error.
pub fn canonical_key(entry: &Entry) -> String {
    let name = WHITESPACE_RUN
        .replace_all(entry.name.trim(), " ")
        .to_lowercase();
    let host = url_host(&entry.url);
    let category = normalized(entry.category.as_deref());
    let language = normalized(entry.language.as_deref());
    let country = normalized(entry.country.as_deref());
    [name, host, category, language, country].join(KEY_DELIMITER)
}

fn url_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

fn normalized(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

/// Strip redundant country/language/category tags from a display name for
/// export, so the sidebar is not littered with repeated markers. Tags are
/// matched as whole words, optionally parenthesized, case-insensitively.
/// This never feeds into the dedup key.
pub fn strip_redundant_tags(name: &str, country: &str, language: &str, category: &str) -> String {
    let mut base = name.to_string();
    for tag in [country, language, category] {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let pattern = format!(r"(?i)\(?\b{}\b\)?", regex::escape(&tag.to_lowercase()));
        if let Ok(re) = Regex::new(&pattern) {
            base = re.replace_all(&base, "").to_string();
        }
    }
    WHITESPACE_RUN.replace_all(&base, " ").trim().to_string()
}
