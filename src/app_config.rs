use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Filter criteria applied to every parsed entry
    #[serde(default)]
    pub filters: FilterConfig,

    /// Stream validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            filters: FilterConfig::default(),
            validation: ValidationConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration values that have invalid ranges.
    pub fn validate(&self) -> Result<()> {
        if self.validation.timeout_secs == 0 {
            return Err(anyhow!("validation.timeout_secs must be greater than 0"));
        }
        if self.validation.min_bytes == 0 {
            return Err(anyhow!("validation.min_bytes must be greater than 0"));
        }
        if self.validation.concurrency == 0 {
            return Err(anyhow!("validation.concurrency must be greater than 0"));
        }
        if self.output.playlist.trim().is_empty()
            || self.output.valid_csv.trim().is_empty()
            || self.output.rejected_csv.trim().is_empty()
        {
            return Err(anyhow!("output paths must not be empty"));
        }
        Ok(())
    }
}

/// Criteria lists; an empty list disables that axis.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FilterConfig {
    // @field: Language codes, e.g. ["fr", "en"]
    #[serde(default)]
    pub languages: Vec<String>,

    // @field: Country codes, e.g. ["CA", "FR"]
    #[serde(default)]
    pub countries: Vec<String>,

    // @field: Category names, e.g. ["News", "Sport"]
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Liveness probe settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationConfig {
    // @field: Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Bytes that assert liveness
    #[serde(default = "default_min_bytes")]
    pub min_bytes: usize,

    // @field: Bounded worker pool size for network stages
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    // @field: User agent sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // @field: Skip the VALIDATE stage entirely
    #[serde(default)]
    pub skip_validation: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            timeout_secs: default_timeout_secs(),
            min_bytes: default_min_bytes(),
            concurrency: default_concurrency(),
            user_agent: default_user_agent(),
            skip_validation: false,
        }
    }
}

/// Output filenames and the raw download directory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    // @field: Kept/validated entries report
    #[serde(default = "default_valid_csv")]
    pub valid_csv: String,

    // @field: Filtered-out and invalid entries report
    #[serde(default = "default_rejected_csv")]
    pub rejected_csv: String,

    // @field: Final curated playlist
    #[serde(default = "default_playlist")]
    pub playlist: String,

    // @field: Directory for raw playlist downloads
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            valid_csv: default_valid_csv(),
            rejected_csv: default_rejected_csv(),
            playlist: default_playlist(),
            raw_dir: default_raw_dir(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    6
}

fn default_min_bytes() -> usize {
    2048
}

fn default_concurrency() -> usize {
    8
}

fn default_user_agent() -> String {
    "M3U-Curator/1.0 (+https://github.com/)".to_string()
}

fn default_valid_csv() -> String {
    "filtered_valid_m3u.csv".to_string()
}

fn default_rejected_csv() -> String {
    "filtered_out.csv".to_string()
}

fn default_playlist() -> String {
    "final_playlist.m3u".to_string()
}

fn default_raw_dir() -> String {
    "RAW".to_string()
}
