//! Per-record processing
//!
//! One record flows Normalizer → Resolver → Fetcher; every outcome along the
//! way — good, empty, or failed — is folded into a [`RecordResult`] here.
//! Nothing escapes this boundary as an error: the batch loop above only ever
//! sees results.

use tracing::{debug, warn};

use crate::config::PacingConfig;
use crate::fetcher::fetch_document;
use crate::normalizer::{CanonicalUrl, normalize};
use crate::resolver::{ResolveOutcome, TargetSource};
use crate::types::{InputRecord, RecordResult, RecordStatus, RetrievedDocument};

/// A processed record: its result plus the retrieved document, if any
#[derive(Debug)]
pub struct ProcessedRecord {
    /// The record's terminal result
    pub result: RecordResult,

    /// The retrieved report document, present only for `DOWNLOADED`
    pub document: Option<RetrievedDocument>,
}

/// Drives one record through the resolution pipeline
///
/// Borrows the shared client and the configured strategy from the runner;
/// owns nothing itself.
pub struct RecordProcessor<'a> {
    /// Shared HTTP client (connection reuse across the whole batch)
    pub client: &'a reqwest::Client,

    /// The configured resolution strategy
    pub source: &'a dyn TargetSource,

    /// Per-record pacing delay
    pub pacing: &'a PacingConfig,
}

impl RecordProcessor<'_> {
    /// Process one input record to its terminal status
    ///
    /// Validation failures terminate before any network call. Resolver and
    /// download failures are converted to their statuses with the error
    /// message preserved. Records that touched the network pace afterwards
    /// so the origin is not hammered; locally-rejected records do not.
    pub async fn process(&self, record: &InputRecord, download: bool) -> ProcessedRecord {
        let listing_url = normalize(Some(record.listing_url_raw.as_str()));

        let Some(canonical) = CanonicalUrl::parse(&listing_url) else {
            debug!(vin = %record.vin, raw = %record.listing_url_raw, "rejected listing URL before fetch");
            return ProcessedRecord {
                result: RecordResult {
                    vin: record.vin.clone(),
                    listing_url,
                    carfax_url: None,
                    status: RecordStatus::InvalidUrl,
                    error: Some("invalid listing URL".to_string()),
                    file_name: None,
                },
                document: None,
            };
        };

        let (status, carfax_url, error, document) =
            match self.source.resolve(self.client, &canonical).await {
                Err(e) => {
                    warn!(vin = %record.vin, error = %e, "resolution failed");
                    (RecordStatus::ResolverError, None, Some(e.to_string()), None)
                }
                Ok(ResolveOutcome::NoToken) => (RecordStatus::NoToken, None, None, None),
                Ok(ResolveOutcome::NoTargetLink) => (RecordStatus::NoTargetLink, None, None, None),
                Ok(ResolveOutcome::NoTargetFound) => {
                    (RecordStatus::NoTargetFound, None, None, None)
                }
                Ok(ResolveOutcome::Resolved(target)) => {
                    if download {
                        match fetch_document(self.client, &target.url, &record.vin).await {
                            Ok(document) => (
                                RecordStatus::Downloaded,
                                Some(target.url),
                                None,
                                Some(document),
                            ),
                            Err(e) => {
                                // The resolved URL survives a failed download
                                warn!(vin = %record.vin, error = %e, "report download failed");
                                (
                                    RecordStatus::DownloadFailed,
                                    Some(target.url),
                                    Some(e.to_string()),
                                    None,
                                )
                            }
                        }
                    } else {
                        (RecordStatus::UrlOnly, Some(target.url), None, None)
                    }
                }
            };

        let result = RecordResult {
            vin: record.vin.clone(),
            listing_url,
            carfax_url,
            status,
            error,
            file_name: document.as_ref().map(|d| d.file_name.clone()),
        };

        if status.reached_network() && !self.pacing.record_delay.is_zero() {
            tokio::time::sleep(self.pacing.record_delay).await;
        }

        ProcessedRecord { result, document }
    }
}
