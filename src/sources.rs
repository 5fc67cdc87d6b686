use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::errors::SourceError;

// @module: Source-list acquisition and raw playlist download

/// Environment variable holding one playlist URL per line (CI mode).
pub const SOURCES_ENV_VAR: &str = "M3U_SOURCES";

/// Directory the raw downloads land in.
pub const RAW_DIR: &str = "RAW";

/// Whether a string is an absolute http(s) URL with a host.
pub fn is_url(s: &str) -> bool {
    match Url::parse(s.trim()) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}

/// Read playlist URLs from the first column of a CSV file. Rows that are
/// empty or do not hold an http(s) URL are skipped.
pub fn read_sources_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SourceError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::CsvRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceError::CsvRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(candidate) = record.get(0) {
            let candidate = candidate.trim();
            if !candidate.is_empty() && is_url(candidate) {
                urls.push(candidate.to_string());
            }
        }
    }
    Ok(urls)
}

/// Read playlist URLs from the `M3U_SOURCES` environment variable, one
/// per line. Non-URL lines are skipped.
pub fn read_sources_from_env() -> Vec<String> {
    std::env::var(SOURCES_ENV_VAR)
        .unwrap_or_default()
        .lines()
        .map(|line| line.trim())
        .filter(|line| is_url(line))
        .map(|line| line.to_string())
        .collect()
}

/// Check that a source URL is reachable: HEAD first, falling back to a
/// streaming GET for servers that reject HEAD. Reachable means any HTTP
/// response arrived; the status itself is judged at download time.
pub async fn verify_url(client: &Client, url: &str) -> bool {
    if !is_url(url) {
        return false;
    }
    match client.head(url).send().await {
        Ok(response) if response.status().as_u16() < 400 => true,
        _ => match client.get(url).send().await {
            Ok(_) => true,
            Err(err) => {
                debug!("URL unreachable {}: {}", url, err);
                false
            }
        },
    }
}

/// Download one playlist byte-for-byte into the RAW directory, returning
/// the destination path. The filename is derived from the URL path,
/// sanitized, prefixed with a timestamp, and given an `.m3u` extension
/// when the source has none.
pub async fn download_playlist(client: &Client, url: &str, raw_dir: &Path) -> Result<PathBuf> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Download request failed for {}", url))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(anyhow!("Download failed with HTTP {} for {}", status.as_u16(), url));
    }

    let name = playlist_filename(url);
    let dest = raw_dir.join(format!("{}_{}", Utc::now().timestamp(), name));

    let mut file = tokio::fs::File::create(&dest)
        .await
        .with_context(|| format!("Failed to create {:?}", dest))?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Download interrupted for {}", url))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {:?}", dest))?;
    }
    file.flush().await?;

    info!("Downloaded {} -> {:?}", url, dest);
    Ok(dest)
}

/// Ensure the RAW download directory exists.
pub fn ensure_raw_dir(raw_dir: &Path) -> Result<()> {
    if !raw_dir.exists() {
        std::fs::create_dir_all(raw_dir)
            .with_context(|| format!("Failed to create {:?}", raw_dir))?;
    }
    Ok(())
}

/// Filesystem-safe filename for a playlist URL.
fn playlist_filename(url: &str) -> String {
    let base = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.last().map(|s| s.to_string()))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "playlist.m3u".to_string());

    let mut name = safe_filename(&base);
    if name.is_empty() {
        name = "playlist.m3u".to_string();
    }
    let lower = name.to_lowercase();
    if !lower.ends_with(".m3u") && !lower.ends_with(".m3u8") && !lower.ends_with(".txt") {
        name.push_str(".m3u");
    }
    name
}

/// Collapse anything outside `[A-Za-z0-9._-]` into underscores and cap the
/// length, so hostile URL paths cannot escape the RAW directory.
fn safe_filename(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_sep = false;
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_');
    trimmed.chars().take(180).collect()
}
