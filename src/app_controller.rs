use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use reqwest::Client;

use crate::app_config::Config;
use crate::cancellation::CancelFlag;
use crate::canonical::canonical_key;
use crate::errors::SourceError;
use crate::export;
use crate::filter::{FilterCriteria, passes_filters};
use crate::playlist::{Entry, PlaylistCollection};
use crate::probe::{HttpProbe, LivenessProbe};
use crate::sources;

// @module: Pipeline orchestrator for the whole batch

/// Per-stage item counts for the run summary.
#[derive(Debug, Clone, Default)]
pub struct StageCounts {
    pub sources: usize,
    pub verified: usize,
    pub downloaded: usize,
    pub parsed: usize,
    pub filter_kept: usize,
    pub filter_rejected: usize,
    pub valid: usize,
    pub invalid: usize,
    pub deduped: usize,
}

/// Final kept/rejected partition of a batch, plus the stage counts.
///
/// `kept_valid` holds deduplicated validated entries in first-seen input
/// order; `rejected` concatenates filter rejects and validation failures,
/// each annotated with its `reject_reason`.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub kept_valid: Vec<Entry>,
    pub rejected: Vec<Entry>,
    pub counts: StageCounts,
}

/// Main application controller driving the batch pipeline.
///
/// Stages run in strict order: VERIFY_URLS, DOWNLOAD, PARSE, FILTER,
/// VALIDATE, DEDUPE, EXPORT. Each stage consumes its full input before the
/// next starts; the network stages run under a bounded worker pool. The
/// cancellation flag is polled before every work item, and later stages
/// always run over whatever partial results exist, so an interrupted run
/// still reaches EXPORT.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Liveness probe used by the VALIDATE stage
    probe: Arc<dyn LivenessProbe>,
    // @field: HTTP client for source verification and download
    client: Client,
}

impl Controller {
    // @method: Create a controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.validation.timeout_secs);
        let probe = HttpProbe::new(
            timeout,
            config.validation.min_bytes,
            &config.validation.user_agent,
        )?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.validation.user_agent.clone())
            .build()
            .context("Failed to build HTTP client for source handling")?;
        Ok(Controller {
            config,
            probe: Arc::new(probe),
            client,
        })
    }

    /// Create a controller with a caller-supplied probe. Used by tests to
    /// run the pipeline without touching the network.
    pub fn with_probe(config: Config, probe: Arc<dyn LivenessProbe>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.validation.user_agent.clone())
            .build()
            .context("Failed to build HTTP client for source handling")?;
        Ok(Controller {
            config,
            probe,
            client,
        })
    }

    /// Run the whole batch: verify and download the source URLs, then
    /// curate the downloaded playlists and export the outputs.
    pub async fn run(&self, source_urls: Vec<String>, cancel: &CancelFlag) -> Result<PipelineReport> {
        if source_urls.is_empty() {
            return Err(SourceError::NoSources {
                checked: "CSV and environment".to_string(),
            }
            .into());
        }

        let start_time = std::time::Instant::now();
        let multi_progress = MultiProgress::new();
        let raw_dir = PathBuf::from(&self.config.output.raw_dir);
        sources::ensure_raw_dir(&raw_dir)?;

        // VERIFY_URLS
        let verified = self.verify_stage(&source_urls, &multi_progress, cancel).await;
        info!("Verified {}/{} source URLs", verified.len(), source_urls.len());

        // DOWNLOAD
        let downloaded = self
            .download_stage(&verified, &raw_dir, &multi_progress, cancel)
            .await;
        info!("Downloaded {}/{} playlists", downloaded.len(), verified.len());

        // PARSE
        let entries = self.parse_stage(&downloaded, &multi_progress, cancel);
        info!("Parsed total entries: {}", entries.len());

        // FILTER -> VALIDATE -> DEDUPE
        let mut report = self
            .curate_entries(entries, Some(&multi_progress), cancel)
            .await;
        report.counts.sources = source_urls.len();
        report.counts.verified = verified.len();
        report.counts.downloaded = downloaded.len();

        // EXPORT: always reached, also on a cancelled run with partials.
        export::write_report_csv(&self.config.output.valid_csv, &report.kept_valid)?;
        export::write_report_csv(&self.config.output.rejected_csv, &report.rejected)?;
        export::write_playlist_m3u(&self.config.output.playlist, &report.kept_valid)?;

        let elapsed = start_time.elapsed();
        info!(
            "Run complete in {}: kept={} rejected={}",
            Self::format_duration(elapsed),
            report.kept_valid.len(),
            report.rejected.len()
        );
        if cancel.is_triggered() {
            warn!("Run was cancelled; outputs hold partial results");
        }

        Ok(report)
    }

    /// Curate already-downloaded playlist texts: PARSE, FILTER, VALIDATE,
    /// DEDUPE, without any export. This is the pipeline core; `run` wraps
    /// it with the network stages and the writers.
    pub async fn curate_texts(&self, texts: &[String], cancel: &CancelFlag) -> PipelineReport {
        let mut entries = Vec::new();
        for text in texts {
            if cancel.is_triggered() {
                break;
            }
            entries.extend(crate::playlist::parse_m3u(text));
        }
        self.curate_entries(entries, None, cancel).await
    }

    async fn curate_entries(
        &self,
        entries: Vec<Entry>,
        multi_progress: Option<&MultiProgress>,
        cancel: &CancelFlag,
    ) -> PipelineReport {
        let mut counts = StageCounts {
            parsed: entries.len(),
            ..StageCounts::default()
        };

        // FILTER
        let criteria = FilterCriteria::new(
            self.config.filters.languages.clone(),
            self.config.filters.countries.clone(),
            self.config.filters.categories.clone(),
        );
        let (kept, filter_rejected) = Self::filter_stage(entries, &criteria, cancel);
        counts.filter_kept = kept.len();
        counts.filter_rejected = filter_rejected.len();
        info!(
            "After filtering: kept={} rejected={}",
            counts.filter_kept, counts.filter_rejected
        );

        // VALIDATE
        let (valid, invalid) = if self.config.validation.skip_validation {
            warn!("Validation skipped by configuration");
            (kept, Vec::new())
        } else {
            self.validate_stage(kept, multi_progress, cancel).await
        };
        counts.valid = valid.len();
        counts.invalid = invalid.len();
        info!(
            "Validation results: valid={} invalid={}",
            counts.valid, counts.invalid
        );

        // DEDUPE: first-seen occurrence wins, in input order.
        let deduped = Self::dedupe_stage(valid);
        counts.deduped = deduped.len();
        info!("Deduplicated: {} -> {}", counts.valid, counts.deduped);

        let mut rejected = filter_rejected;
        rejected.extend(invalid);

        PipelineReport {
            kept_valid: deduped,
            rejected,
            counts,
        }
    }

    async fn verify_stage(
        &self,
        source_urls: &[String],
        multi_progress: &MultiProgress,
        cancel: &CancelFlag,
    ) -> Vec<String> {
        let progress = Self::stage_progress(multi_progress, source_urls.len() as u64, "Verifying URLs");
        let concurrency = self.config.validation.concurrency;

        let mut results: Vec<(usize, Option<String>)> =
            stream::iter(source_urls.iter().cloned().enumerate())
                .map(|(idx, url)| {
                    let client = self.client.clone();
                    let cancel = cancel.clone();
                    let progress = progress.clone();
                    async move {
                        if cancel.is_triggered() {
                            return (idx, None);
                        }
                        let reachable = sources::verify_url(&client, &url).await;
                        progress.inc(1);
                        if reachable {
                            (idx, Some(url))
                        } else {
                            warn!("Unreachable or invalid URL: {}", url);
                            (idx, None)
                        }
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        progress.finish_and_clear();
        // Completion order differs under the pool; restore source order.
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().filter_map(|(_, url)| url).collect()
    }

    async fn download_stage(
        &self,
        urls: &[String],
        raw_dir: &std::path::Path,
        multi_progress: &MultiProgress,
        cancel: &CancelFlag,
    ) -> Vec<PathBuf> {
        let progress = Self::stage_progress(multi_progress, urls.len() as u64, "Downloading");
        let concurrency = self.config.validation.concurrency;

        let mut results: Vec<(usize, Option<PathBuf>)> =
            stream::iter(urls.iter().cloned().enumerate())
                .map(|(idx, url)| {
                    let client = self.client.clone();
                    let cancel = cancel.clone();
                    let progress = progress.clone();
                    let raw_dir = raw_dir.to_path_buf();
                    async move {
                        if cancel.is_triggered() {
                            return (idx, None);
                        }
                        let downloaded = match sources::download_playlist(&client, &url, &raw_dir).await {
                            Ok(dest) => Some(dest),
                            Err(err) => {
                                warn!("{:#}", err);
                                None
                            }
                        };
                        progress.inc(1);
                        (idx, downloaded)
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        progress.finish_and_clear();
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().filter_map(|(_, dest)| dest).collect()
    }

    fn parse_stage(
        &self,
        files: &[PathBuf],
        multi_progress: &MultiProgress,
        cancel: &CancelFlag,
    ) -> Vec<Entry> {
        let progress = Self::stage_progress(multi_progress, files.len() as u64, "Parsing");
        let mut entries = Vec::new();
        for path in files {
            if cancel.is_triggered() {
                break;
            }
            match PlaylistCollection::parse_file(path) {
                Ok(playlist) => {
                    debug!(
                        "Parsed {} entries from {:?}",
                        playlist.entries.len(),
                        playlist.source_file
                    );
                    entries.extend(playlist.entries);
                }
                Err(err) => warn!("Failed to parse {:?}: {:#}", path, err),
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        entries
    }

    fn filter_stage(
        entries: Vec<Entry>,
        criteria: &FilterCriteria,
        cancel: &CancelFlag,
    ) -> (Vec<Entry>, Vec<Entry>) {
        let mut kept = Vec::new();
        let mut rejected = Vec::new();
        for entry in entries {
            if cancel.is_triggered() {
                break;
            }
            let (ok, reason) = passes_filters(&entry, criteria);
            if ok {
                kept.push(entry);
            } else {
                rejected.push(entry.rejected(reason));
            }
        }
        (kept, rejected)
    }

    async fn validate_stage(
        &self,
        kept: Vec<Entry>,
        multi_progress: Option<&MultiProgress>,
        cancel: &CancelFlag,
    ) -> (Vec<Entry>, Vec<Entry>) {
        let progress = multi_progress
            .map(|mp| Self::stage_progress(mp, kept.len() as u64, "Validating"))
            .unwrap_or_else(ProgressBar::hidden);
        let concurrency = self.config.validation.concurrency;

        let mut results: Vec<(usize, Option<Entry>)> = stream::iter(kept.into_iter().enumerate())
            .map(|(idx, entry)| {
                let probe = Arc::clone(&self.probe);
                let cancel = cancel.clone();
                let progress = progress.clone();
                async move {
                    if cancel.is_triggered() {
                        // Untouched; the entry simply drops out of this run.
                        return (idx, None);
                    }
                    let outcome = probe.probe(&entry.url).await;
                    progress.inc(1);
                    let annotated = if outcome.is_valid {
                        entry.with_http_status(outcome.status)
                    } else {
                        entry.rejected(&outcome.reason).with_http_status(outcome.status)
                    };
                    (idx, Some(annotated))
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        progress.finish_and_clear();
        results.sort_by_key(|(idx, _)| *idx);

        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for entry in results.into_iter().filter_map(|(_, e)| e) {
            if entry.reject_reason.is_none() {
                valid.push(entry);
            } else {
                invalid.push(entry);
            }
        }
        (valid, invalid)
    }

    fn dedupe_stage(entries: Vec<Entry>) -> Vec<Entry> {
        let mut seen = HashSet::new();
        let mut deduped = Vec::new();
        for entry in entries {
            if seen.insert(canonical_key(&entry)) {
                deduped.push(entry);
            }
        }
        deduped
    }

    fn stage_progress(multi_progress: &MultiProgress, len: u64, message: &'static str) -> ProgressBar {
        let progress = multi_progress.add(ProgressBar::new(len));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(template_result.progress_chars("█▓▒░"));
        progress.set_message(message);
        progress
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
