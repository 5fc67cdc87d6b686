/*!
 * # m3u-curator
 *
 * A Rust library for batch curation of IPTV M3U playlists.
 *
 * ## Features
 *
 * - Download playlists from a list of source URLs (CSV file or env var)
 * - Parse extended-M3U metadata into typed channel entries
 * - Filter channels by language, country and category
 * - Probe every surviving stream for liveness over HTTP
 * - Deduplicate apparent duplicates via a canonical channel key
 * - Export a cleaned playlist plus CSV reports of kept and rejected channels
 * - Cooperative cancellation: Ctrl+C keeps partial results
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `playlist`: Entry model and extended-M3U parsing
 * - `filter`: Language/country/category accept-reject decisions
 * - `canonical`: Canonical dedup key and display-name cleanup
 * - `probe`: Stream liveness probing:
 *   - `probe::http`: HTTP probe over reqwest
 *   - `probe::mock`: Canned outcomes for tests
 * - `sources`: Source-list acquisition and raw playlist download
 * - `export`: CSV report and final playlist writers
 * - `app_controller`: Pipeline orchestrator
 * - `cancellation`: Cooperative cancellation flag
 * - `publish`: Optional git publishing of the outputs
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cancellation;
pub mod canonical;
pub mod errors;
pub mod export;
pub mod filter;
pub mod playlist;
pub mod probe;
pub mod publish;
pub mod sources;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, PipelineReport};
pub use cancellation::CancelFlag;
pub use errors::{AppError, ExportError, SourceError};
pub use filter::FilterCriteria;
pub use playlist::{Entry, PlaylistCollection};
pub use probe::{LivenessProbe, ProbeOutcome};
