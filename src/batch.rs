//! Batch orchestration
//!
//! [`CarfaxFetcher`] owns the shared HTTP client, the configured resolution
//! strategy, and the event channel; [`CarfaxFetcher::run`] drives every input
//! row through the record processor and assembles the output artifacts. The
//! runner is the sole mutator of the result sequence and the document map —
//! processed records hand back immutable values for it to merge.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::archive::build_archive;
use crate::client::build_client;
use crate::config::Config;
use crate::error::Result;
use crate::processor::RecordProcessor;
use crate::resolver::{TargetSource, source_for};
use crate::table::InputTable;
use crate::types::{BatchOutput, Event, RetrievedDocument, RunOptions};

/// Capacity of the progress event channel; slow consumers lag rather than
/// block the batch
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Warning surfaced when downloads were requested but none succeeded
const NO_REPORTS_WARNING: &str =
    "no report documents were downloaded; check the result log for per-record statuses";

/// Batch runner: resolves every listing in an inventory export and collects
/// the output artifacts
///
/// Construct one per run configuration and reuse it across batches; the
/// underlying HTTP connection pool is shared across all fetches.
pub struct CarfaxFetcher {
    config: Config,
    client: reqwest::Client,
    source: Box<dyn TargetSource>,
    events: broadcast::Sender<Event>,
}

impl CarfaxFetcher {
    /// Build a runner from its configuration
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] when a header value or the scrape
    /// strategy's CSS selector is invalid.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(&config.http)?;
        let source = source_for(&config.resolver, &config.retry)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            client,
            source,
            events,
        })
    }

    /// Subscribe to batch progress events
    ///
    /// Events are broadcast; any number of consumers may subscribe, and a
    /// runner with no subscribers simply drops them.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// The runner's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one input table to completion
    ///
    /// Records are processed strictly in input order, one at a time, each
    /// fully resolved (including any document fetch) before the next begins.
    /// A single record's failure never aborts the batch — failure isolation
    /// is per record, and the run always produces a result log.
    ///
    /// When [`RunOptions::cancel`] fires, no new records are started and the
    /// partial output built from completed records is returned.
    ///
    /// # Errors
    ///
    /// Only an empty or unparseable input table (or a missing designated
    /// column) fails the run — and it does so before any record is touched.
    pub async fn run(&self, input: &[u8], options: RunOptions) -> Result<BatchOutput> {
        let table = InputTable::parse(input, &self.config.columns)?;
        let records = table.records();
        let total = records.len();

        info!(
            total,
            download = options.download_reports,
            "starting batch run"
        );

        let processor = RecordProcessor {
            client: &self.client,
            source: self.source.as_ref(),
            pacing: &self.config.pacing,
        };

        let mut results = Vec::with_capacity(total);
        // Documents keyed by VIN; a duplicate VIN overwrites its slot
        // (last-write-wins), keeping one file per VIN in the archive.
        let mut documents: Vec<RetrievedDocument> = Vec::new();
        let mut document_slots: HashMap<String, usize> = HashMap::new();

        for record in &records {
            if let Some(token) = &options.cancel
                && token.is_cancelled()
            {
                warn!(
                    processed = results.len(),
                    total, "batch run cancelled; returning partial output"
                );
                break;
            }

            let _ = self.events.send(Event::RecordStarted {
                index: record.row,
                total,
                vin: record.vin.clone(),
            });

            let processed = processor.process(record, options.download_reports).await;

            if let Some(document) = processed.document {
                match document_slots.entry(processed.result.vin.clone()) {
                    Entry::Occupied(slot) => documents[*slot.get()] = document,
                    Entry::Vacant(slot) => {
                        slot.insert(documents.len());
                        documents.push(document);
                    }
                }
            }

            let _ = self.events.send(Event::RecordFinished {
                index: record.row,
                total,
                result: processed.result.clone(),
            });
            results.push(processed.result);
        }

        // Enrichment join: the first result seen per VIN wins; later
        // duplicates are ignored for the join.
        let mut lookup: HashMap<String, Option<String>> = HashMap::new();
        for result in &results {
            lookup
                .entry(result.vin.clone())
                .or_insert_with(|| result.carfax_url.clone());
        }

        let enriched_table = table.enriched_csv(&self.config.resolved_column, &lookup)?;

        let (archive, warning) = if options.download_reports {
            if documents.is_empty() {
                (None, Some(NO_REPORTS_WARNING.to_string()))
            } else {
                (Some(build_archive(&documents)?), None)
            }
        } else {
            (None, None)
        };

        let output = BatchOutput {
            enriched_table,
            archive,
            results,
            warning,
        };

        info!(
            total,
            processed = output.results.len(),
            downloaded = output.downloaded_count(),
            "batch run finished"
        );
        let _ = self.events.send(Event::BatchFinished {
            processed: output.results.len(),
            total,
            downloaded: output.downloaded_count(),
        });

        Ok(output)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, InputError};

    fn runner() -> CarfaxFetcher {
        CarfaxFetcher::new(Config::default()).unwrap()
    }

    #[tokio::test]
    async fn empty_input_halts_before_processing() {
        let err = runner()
            .run(b"VIN,EBROCHURE_URL\n", RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Input(InputError::EmptyTable)));
    }

    #[tokio::test]
    async fn missing_column_halts_before_processing() {
        let err = runner()
            .run(b"A,B\n1,2\n", RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Input(InputError::MissingColumn { .. })
        ));
    }

    #[tokio::test]
    async fn pre_cancelled_run_returns_an_empty_partial_output() {
        let cancel = tokio_util::sync::CancellationToken::new();
        cancel.cancel();

        let output = runner()
            .run(
                b"VIN,EBROCHURE_URL\nVIN1,https://dealer.invalid/v/1\n",
                RunOptions {
                    download_reports: false,
                    cancel: Some(cancel),
                },
            )
            .await
            .unwrap();

        assert!(output.results.is_empty());
        assert!(output.archive.is_none());
        // The enriched table still carries every input row, unresolved
        let text = String::from_utf8(output.enriched_table).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
