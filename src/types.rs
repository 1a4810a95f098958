//! Core types and events for carfax-dl

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// One row of the source table, reduced to the two designated cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputRecord {
    /// Zero-based row index in the input table
    pub row: usize,

    /// VIN for this row; rows with an empty VIN cell fall back to `row_<n>`
    pub vin: String,

    /// Raw listing URL cell content, possibly malformed
    pub listing_url_raw: String,
}

/// Terminal status of one processed record
///
/// The taxonomy separates hard failures (`INVALID_URL`, `RESOLVER_ERROR`,
/// `DOWNLOAD_FAILED`) from legitimate no-target outcomes (`NO_TOKEN`,
/// `NO_TARGET_LINK`, `NO_TARGET_FOUND`) — a listing without a report link is
/// not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// The listing URL cell did not normalize to a valid http(s) URL
    InvalidUrl,
    /// API strategy: the listing URL carries no vehicle token parameter
    NoToken,
    /// Scrape strategy: the listing page has no report anchor
    NoTargetLink,
    /// API strategy: the API response carries no report URL
    NoTargetFound,
    /// The primary fetch exhausted its retries, or the resolver response was
    /// malformed
    ResolverError,
    /// A report URL was resolved; downloading was disabled
    UrlOnly,
    /// A report URL was resolved and the document was retrieved
    Downloaded,
    /// A report URL was resolved but the document fetch failed
    DownloadFailed,
}

impl RecordStatus {
    /// Stable display form, matching the serialized representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::InvalidUrl => "INVALID_URL",
            RecordStatus::NoToken => "NO_TOKEN",
            RecordStatus::NoTargetLink => "NO_TARGET_LINK",
            RecordStatus::NoTargetFound => "NO_TARGET_FOUND",
            RecordStatus::ResolverError => "RESOLVER_ERROR",
            RecordStatus::UrlOnly => "URL_ONLY",
            RecordStatus::Downloaded => "DOWNLOADED",
            RecordStatus::DownloadFailed => "DOWNLOAD_FAILED",
        }
    }

    /// Whether a record with this status issued at least one network request
    ///
    /// `INVALID_URL` and `NO_TOKEN` are decided locally, before any fetch;
    /// the per-record pacing delay does not apply to them.
    pub fn reached_network(&self) -> bool {
        !matches!(self, RecordStatus::InvalidUrl | RecordStatus::NoToken)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of processing one input record
///
/// Created once by the record processor and never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordResult {
    /// VIN (or `row_<n>` fallback) identifying the record
    pub vin: String,

    /// Normalized listing URL the record was processed with
    pub listing_url: String,

    /// Resolved report URL, retained even when the document fetch failed
    pub carfax_url: Option<String>,

    /// Terminal status
    pub status: RecordStatus,

    /// Error message for the failure statuses
    pub error: Option<String>,

    /// Archive filename, present only for `DOWNLOADED`
    pub file_name: Option<String>,
}

/// A retrieved report document ready for archiving
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedDocument {
    /// Sanitized-VIN filename including the inferred extension
    pub file_name: String,

    /// Raw document bytes
    pub bytes: Vec<u8>,
}

/// Progress events emitted over the runner's broadcast channel
///
/// Consumers subscribe via [`crate::CarfaxFetcher::subscribe`]; the library
/// never requires polling.
#[derive(Clone, Debug)]
pub enum Event {
    /// Processing of a record is about to begin
    RecordStarted {
        /// Zero-based row index
        index: usize,
        /// Total number of records in the batch
        total: usize,
        /// VIN of the record
        vin: String,
    },
    /// A record finished processing
    RecordFinished {
        /// Zero-based row index
        index: usize,
        /// Total number of records in the batch
        total: usize,
        /// The record's result
        result: RecordResult,
    },
    /// The batch finished (possibly early, after cancellation)
    BatchFinished {
        /// Number of records actually processed
        processed: usize,
        /// Total number of records in the batch
        total: usize,
        /// Number of records that reached `DOWNLOADED`
        downloaded: usize,
    },
}

/// Options for a single batch run
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Download the resolved report documents into the archive
    /// (default: true)
    pub download_reports: bool,

    /// Cooperative cancellation: when the token fires, no new records are
    /// started and the partial output is returned
    pub cancel: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            download_reports: true,
            cancel: None,
        }
    }
}

/// Output artifacts of one batch run
///
/// Always recomputed from the result sequence; never mutated incrementally.
#[derive(Clone, Debug)]
pub struct BatchOutput {
    /// The input table with the resolved-URL column appended, as CSV bytes
    pub enriched_table: Vec<u8>,

    /// Deflate-compressed ZIP of retrieved documents, present only when
    /// downloads were requested and at least one succeeded
    pub archive: Option<Vec<u8>>,

    /// Per-record results in processing order
    pub results: Vec<RecordResult>,

    /// Caller-visible warning, e.g. downloads were requested but none
    /// succeeded
    pub warning: Option<String>,
}

impl BatchOutput {
    /// Render the per-record result log as CSV bytes
    ///
    /// Columns: VIN, LISTING_URL, CARFAX_URL, STATUS, ERROR_MESSAGE,
    /// FILE_NAME — suitable for direct display or export.
    pub fn results_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "VIN",
            "LISTING_URL",
            "CARFAX_URL",
            "STATUS",
            "ERROR_MESSAGE",
            "FILE_NAME",
        ])?;

        for result in &self.results {
            writer.write_record([
                result.vin.as_str(),
                result.listing_url.as_str(),
                result.carfax_url.as_deref().unwrap_or(""),
                result.status.as_str(),
                result.error.as_deref().unwrap_or(""),
                result.file_name.as_deref().unwrap_or(""),
            ])?;
        }

        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }

    /// Number of records that reached `DOWNLOADED`
    pub fn downloaded_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == RecordStatus::Downloaded)
            .count()
    }
}
