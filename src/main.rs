// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};

use crate::app_config::Config;
use crate::errors::SourceError;
use app_controller::Controller;
use cancellation::CancelFlag;

mod app_config;
mod app_controller;
mod cancellation;
mod canonical;
mod errors;
mod export;
mod filter;
mod playlist;
mod probe;
mod publish;
mod sources;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse, filter, validate and export M3U playlists (default command)
    #[command(alias = "curate")]
    Curate(CurateArgs),

    /// Generate shell completions for m3u-curator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct CurateArgs {
    /// Path to a local CSV whose first column holds playlist URLs
    #[arg(long, default_value = "sources.csv")]
    csv: String,

    /// Filter languages (e.g. fr en)
    #[arg(long = "lang", num_args = 0..)]
    languages: Vec<String>,

    /// Filter countries (e.g. CA FR)
    #[arg(long = "country", num_args = 0..)]
    countries: Vec<String>,

    /// Filter categories (e.g. News Sport)
    #[arg(long = "category", num_args = 0..)]
    categories: Vec<String>,

    /// Skip HTTP validation (fast parse/filter only)
    #[arg(long)]
    skip_validate: bool,

    /// Do not commit/push outputs
    #[arg(long)]
    no_git: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// m3u-curator - Batch curator for IPTV M3U playlists
///
/// Downloads playlists from a list of source URLs, extracts channel
/// entries, filters them, probes each stream for liveness, deduplicates
/// and exports a cleaned playlist plus CSV reports.
#[derive(Parser, Debug)]
#[command(name = "m3u-curator")]
#[command(version = "1.0.0")]
#[command(about = "Parse, filter, validate and publish M3U playlists")]
#[command(long_about = "m3u-curator ingests a list of playlist URLs, downloads each playlist,
filters and validates the channels, and exports a cleaned canonical
playlist plus a rejects report.

EXAMPLES:
    m3u-curator --csv sources.csv               # Curate with default filters
    m3u-curator --lang fr en --country CA       # Keep French/English, Canadian channels
    m3u-curator --skip-validate                 # Fast parse/filter only
    m3u-curator --no-git                        # Do not commit/push the outputs
    m3u-curator completions bash                # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.

CI MODE:
    When GITHUB_ACTIONS=true, source URLs are read from the M3U_SOURCES
    environment variable (one per line) instead of the CSV.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    curate: CurateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");

            let mut stderr = std::io::stderr();
            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "m3u-curator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Curate(args)) => run_curate(args).await,
        None => run_curate(cli.curate).await,
    }
}

async fn run_curate(options: CurateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_level));
    }

    let config = load_config(&options)?;
    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Ctrl+C sets the cancellation flag; stages drain at item granularity
    // and the pipeline still exports whatever it has.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n[!] Ctrl+C detected - completing current step and saving partial results...");
                cancel.trigger();
            }
        });
    }

    let source_urls = load_sources(&options.csv)?;
    info!("Processing {} source URLs (press Ctrl+C to abort)", source_urls.len());

    let controller = Controller::with_config(config.clone())?;
    let report = controller.run(source_urls, &cancel).await?;

    if !options.no_git {
        publish::commit_and_push(&[
            &config.output.valid_csv,
            &config.output.rejected_csv,
            &config.output.playlist,
        ])
        .await;
    }

    info!("- Summary -");
    info!("Sources (input) : {}", report.counts.sources);
    info!("Verified URLs   : {}", report.counts.verified);
    info!("Downloaded      : {}", report.counts.downloaded);
    info!("Parsed entries  : {}", report.counts.parsed);
    info!("Kept (pre-val)  : {}", report.counts.filter_kept);
    info!("Valid streams   : {} (after dedup)", report.counts.deduped);
    info!("Rejected        : {}", report.rejected.len());
    info!("Final playlist  : {}", config.output.playlist);

    Ok(())
}

/// Load the config file, creating a default one when missing, and apply
/// the CLI overrides on top.
fn load_config(options: &CurateArgs) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if !options.languages.is_empty() {
        config.filters.languages = options.languages.clone();
    }
    if !options.countries.is_empty() {
        config.filters.countries = options.countries.clone();
    }
    if !options.categories.is_empty() {
        config.filters.categories = options.categories.clone();
    }
    if options.skip_validate {
        config.validation.skip_validation = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

/// Resolve the source URL list: the `M3U_SOURCES` environment variable in
/// CI mode, the local CSV otherwise. No sources anywhere is the one hard
/// failure of a run.
fn load_sources(csv_path: &str) -> Result<Vec<String>> {
    if std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true") {
        let urls = sources::read_sources_from_env();
        info!("CI mode: read {} URLs from env {}", urls.len(), sources::SOURCES_ENV_VAR);
        if urls.is_empty() {
            return Err(SourceError::NoSources {
                checked: format!("env {}", sources::SOURCES_ENV_VAR),
            }
            .into());
        }
        return Ok(urls);
    }

    if !Path::new(csv_path).exists() {
        return Err(anyhow!("CSV not found: {}", csv_path));
    }
    let urls = sources::read_sources_from_csv(csv_path)?;
    info!("Local mode: read {} URLs from CSV {}", urls.len(), csv_path);
    if urls.is_empty() {
        return Err(SourceError::NoSources {
            checked: format!("CSV {}", csv_path),
        }
        .into());
    }
    Ok(urls)
}
