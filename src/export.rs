use std::path::Path;

use log::info;

use crate::canonical::strip_redundant_tags;
use crate::errors::ExportError;
use crate::playlist::{Entry, M3U_HEADER};

// @module: CSV report and final playlist writers

/// Fixed column set for both CSV reports.
const CSV_COLUMNS: [&str; 11] = [
    "name",
    "url",
    "country",
    "language",
    "category",
    "quality",
    "tvg_id",
    "tvg_name",
    "tvg_logo",
    "reject_reason",
    "http_status",
];

/// Write entries as a CSV report with the fixed column set.
pub fn write_report_csv<P: AsRef<Path>>(path: P, rows: &[Entry]) -> Result<(), ExportError> {
    let path = path.as_ref();
    let write_failed = |message: String| ExportError::WriteFailed {
        path: path.to_path_buf(),
        message,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|e| write_failed(e.to_string()))?;
    writer
        .write_record(CSV_COLUMNS)
        .map_err(|e| write_failed(e.to_string()))?;

    for entry in rows {
        let status = entry
            .http_status
            .map(|s| s.to_string())
            .unwrap_or_default();
        writer
            .write_record([
                entry.name.as_str(),
                entry.url.as_str(),
                entry.country.as_deref().unwrap_or(""),
                entry.language.as_deref().unwrap_or(""),
                entry.category.as_deref().unwrap_or(""),
                entry.quality.as_deref().unwrap_or(""),
                entry.tvg_id.as_deref().unwrap_or(""),
                entry.tvg_name.as_deref().unwrap_or(""),
                entry.tvg_logo.as_deref().unwrap_or(""),
                entry.reject_reason.as_deref().unwrap_or(""),
                status.as_str(),
            ])
            .map_err(|e| write_failed(e.to_string()))?;
    }

    writer.flush().map_err(|e| write_failed(e.to_string()))?;
    info!("Wrote CSV {:?} ({} rows)", path, rows.len());
    Ok(())
}

/// Render entries back into extended-M3U text. Attributes are emitted in a
/// fixed order, only when present; display names get the redundant-tag
/// cleanup applied.
pub fn render_playlist(rows: &[Entry]) -> String {
    let mut out = String::new();
    out.push_str(M3U_HEADER);
    out.push('\n');

    for entry in rows {
        let mut attrs: Vec<String> = Vec::new();
        let mut push_attr = |key: &str, value: &Option<String>| {
            if let Some(value) = value {
                if !value.is_empty() {
                    attrs.push(format!("{}=\"{}\"", key, value));
                }
            }
        };
        push_attr("tvg-id", &entry.tvg_id);
        push_attr("tvg-name", &entry.tvg_name);
        push_attr("tvg-logo", &entry.tvg_logo);
        push_attr("group-title", &entry.category);
        push_attr("country", &entry.country);
        push_attr("language", &entry.language);
        push_attr("quality", &entry.quality);

        let name = strip_redundant_tags(
            &entry.name,
            entry.country.as_deref().unwrap_or(""),
            entry.language.as_deref().unwrap_or(""),
            entry.category.as_deref().unwrap_or(""),
        );

        out.push_str(&format!("#EXTINF:-1 {},{}\n", attrs.join(" "), name));
        out.push_str(&entry.url);
        out.push('\n');
    }

    out
}

/// Write the final curated playlist.
pub fn write_playlist_m3u<P: AsRef<Path>>(path: P, rows: &[Entry]) -> Result<(), ExportError> {
    let path = path.as_ref();
    std::fs::write(path, render_playlist(rows)).map_err(|e| ExportError::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    info!("Wrote M3U {:?} ({} entries)", path, rows.len());
    Ok(())
}
