// src/error.rs
// =============================================================================
// Error types for the scan pipeline.
//
// Only two things can make a scan fail outright:
// - We can't get the content items (source error)
// - We can't write the report (report error)
//
// A broken image is NOT an error here. The checker turns every network
// failure into data (see checker/http.rs), so nothing in this file is about
// individual URLs.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Errors from a content source (WordPress API, export file, ...)
#[derive(Error, Debug)]
pub enum SourceError {
    /// The HTTP request to the content backend failed
    #[error("request to content source failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The content backend answered with a non-success status
    #[error("content source returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The site URL we were given can't be used as an API base
    #[error("invalid content source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Reading an export file failed
    #[error("failed to read content file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An export file isn't the JSON we expect
    #[error("failed to parse content file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from writing the report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Terminal errors of a whole scan run
#[derive(Error, Debug)]
pub enum ScanError {
    /// The HTTP client for the probes could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Source unreachable or unusable: no report is produced
    #[error("failed to fetch content items: {0}")]
    Fetch(#[source] SourceError),

    /// Sink unwritable: the scan's work is lost
    #[error("failed to persist report: {0}")]
    Write(#[source] ReportError),
}
