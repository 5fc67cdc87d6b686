/*!
 * Error types for the m3u-curator application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 *
 * Per-item failures in the pipeline (a dead stream, a malformed entry
 * block) are deliberately NOT errors: they are recorded on the entry as a
 * `reject_reason` so that one bad item never aborts a multi-hundred-item
 * batch. The types here cover the failures that do stop a run.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while acquiring the source list.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No usable playlist URL could be found anywhere
    #[error("No playlist sources available (checked {checked})")]
    NoSources {
        /// Description of where sources were looked for
        checked: String,
    },

    /// The sources CSV could not be read
    #[error("Failed to read sources CSV {path:?}: {message}")]
    CsvRead {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying failure
        message: String,
    },
}

/// Errors that can occur while writing the curated outputs.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A report or playlist file could not be written
    #[error("Failed to write output {path:?}: {message}")]
    WriteFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying failure
        message: String,
    },
}

/// Main application error type that wraps all other errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error acquiring the source list
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error writing outputs
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
