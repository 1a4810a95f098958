//! Error types for carfax-dl
//!
//! This module provides the error handling for the library:
//! - Domain-specific error types (Input, Resolve, Download)
//! - A crate-wide [`Result`] alias
//! - Conversions from the underlying I/O, CSV, and archive errors
//!
//! Note that a listing that legitimately has no report link is *not* an
//! error — it is a terminal record status (see [`crate::types::RecordStatus`]).

use thiserror::Error;

/// Result type alias for carfax-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for carfax-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "link_selector")
        key: Option<String>,
    },

    /// Input table error (empty, unparseable, or missing a designated column)
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Primary resolution failed after all retries, or the resolver response
    /// was malformed
    #[error("resolver error: {0}")]
    Resolve(#[from] ResolveError),

    /// Report document download failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// ZIP archive error
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input table errors
///
/// These are the only errors that abort a batch run before any record is
/// processed. Everything downstream is isolated per record.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input table parsed but contains no data rows
    #[error("input table is empty")]
    EmptyTable,

    /// A caller-designated column is not present in the header row
    #[error("input table has no {role} column named {name:?}")]
    MissingColumn {
        /// Which designated column is missing ("listing URL" or "VIN")
        role: &'static str,
        /// The column name the caller asked for
        name: String,
    },

    /// The input bytes could not be parsed as a delimited table
    #[error("failed to parse input table: {0}")]
    Parse(String),
}

/// Resolver errors (primary fetch and target extraction)
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A single fetch attempt failed at the transport level
    #[error("request for {url} failed: {reason}")]
    Request {
        /// The URL that was being fetched
        url: String,
        /// The underlying transport error
        reason: String,
    },

    /// A single fetch attempt returned a non-success HTTP status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The URL that was being fetched
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// The retry budget is exhausted; carries the last underlying error
    #[error("fetch failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Total number of attempts made
        attempts: u32,
        /// Display form of the last attempt's error
        last_error: String,
    },

    /// The resolver API response body was not valid JSON
    #[error("resolver response was not valid JSON: {reason}")]
    MalformedResponse {
        /// The JSON parse error
        reason: String,
    },
}

/// Report document download errors
///
/// The download is best-effort: these errors degrade a record to
/// `DOWNLOAD_FAILED` but never discard the already-resolved report URL.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request failed at the transport level (timeout, DNS, reset, ...)
    #[error("report download failed for {url}: {reason}")]
    Failed {
        /// The report URL being downloaded
        url: String,
        /// The underlying transport error
        reason: String,
    },

    /// The server answered with a non-success HTTP status
    #[error("report download returned HTTP {status} for {url}")]
    BadStatus {
        /// The HTTP status code
        status: u16,
        /// The report URL being downloaded
        url: String,
    },
}
