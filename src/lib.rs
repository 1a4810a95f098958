//! # carfax-dl
//!
//! Batch library that resolves vehicle listing exports into Carfax report
//! links and, optionally, downloads the reports into a ZIP archive.
//!
//! ## Design Philosophy
//!
//! carfax-dl is designed to be:
//! - **Library-first** - No CLI or UI; the surrounding presentation layer
//!   supplies the input table and column choices and receives byte blobs back
//! - **Sensible defaults** - `Config::default()` scrapes listing pages for a
//!   report anchor and appends a `CARFAX_URL` column
//! - **Failure-isolated** - A single bad record never aborts the batch; every
//!   outcome lands in the per-record result log
//! - **Event-driven** - Consumers subscribe to progress events, no polling
//!   required
//!
//! ## Quick Start
//!
//! ```no_run
//! use carfax_dl::{CarfaxFetcher, Config, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = CarfaxFetcher::new(Config::default())?;
//!
//!     // Subscribe to progress events
//!     let mut events = fetcher.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let input = std::fs::read("inventory.csv")?;
//!     let output = fetcher.run(&input, RunOptions::default()).await?;
//!
//!     std::fs::write("inventory_with_carfax.csv", &output.enriched_table)?;
//!     if let Some(archive) = &output.archive {
//!         std::fs::write("carfax_reports.zip", archive)?;
//!     }
//!     std::fs::write("results.csv", output.results_csv()?)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Report archive construction
pub mod archive;
/// Batch orchestration
pub mod batch;
/// Shared HTTP client construction
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Report document retrieval
pub mod fetcher;
/// Listing URL normalization and validation
pub mod normalizer;
/// Per-record processing
pub mod processor;
/// Report URL resolution strategies
pub mod resolver;
/// Retry logic with linear backoff
pub mod retry;
/// Input table parsing and enriched-table output
pub mod table;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use batch::CarfaxFetcher;
pub use config::{
    ApiConfig, ColumnSpec, Config, HttpConfig, PacingConfig, ResolverConfig, RetryConfig,
    ScrapeConfig,
};
pub use error::{DownloadError, Error, InputError, ResolveError, Result};
pub use normalizer::{CanonicalUrl, is_valid_url, normalize};
pub use resolver::{ApiResolver, ResolveOutcome, ResolvedTarget, ScrapeResolver, TargetSource};
pub use types::{
    BatchOutput, Event, InputRecord, RecordResult, RecordStatus, RetrievedDocument, RunOptions,
};
