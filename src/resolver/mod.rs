//! Report URL resolution
//!
//! Turning a listing URL into a Carfax report URL works one of two ways:
//! - [`scrape`] — fetch the listing page and pull the report anchor out of
//!   the HTML
//! - [`api`] — extract the vehicle token from the listing URL and ask the
//!   backing lookup API
//!
//! Both strategies implement [`TargetSource`]; the strategy is chosen when
//! the runner is built and never switches mid-batch. Only the primary fetch
//! in here is retried — see [`crate::retry`].

mod api;
mod scrape;

pub use api::ApiResolver;
pub use scrape::ScrapeResolver;

use async_trait::async_trait;

use crate::config::{ResolverConfig, RetryConfig};
use crate::error::{ResolveError, Result};
use crate::normalizer::CanonicalUrl;
use crate::retry::with_linear_backoff;

/// A resolved report target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// The report URL, trimmed
    pub url: String,

    /// The raw vehicle token the target was derived from (API strategy only)
    pub token: Option<String>,
}

/// Outcome of resolving one listing
///
/// The no-target variants are legitimate terminal states, not failures: the
/// listing simply has no linked report. Hard failures surface as
/// [`ResolveError`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// A report URL was found
    Resolved(ResolvedTarget),
    /// API strategy: the listing URL carries no vehicle token parameter
    NoToken,
    /// Scrape strategy: the listing page has no report anchor
    NoTargetLink,
    /// API strategy: the API response carries no report URL
    NoTargetFound,
}

/// The seam between the record processor and a resolution strategy
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Resolve one validated listing URL into a report target
    async fn resolve(
        &self,
        client: &reqwest::Client,
        listing_url: &CanonicalUrl,
    ) -> std::result::Result<ResolveOutcome, ResolveError>;
}

/// Build the configured strategy implementation
///
/// # Errors
///
/// Returns [`crate::Error::Config`] when the scrape strategy's CSS selector
/// does not parse.
pub fn source_for(config: &ResolverConfig, retry: &RetryConfig) -> Result<Box<dyn TargetSource>> {
    match config {
        ResolverConfig::Scrape(scrape) => {
            Ok(Box::new(ScrapeResolver::new(scrape, retry.clone())?))
        }
        ResolverConfig::Api(api) => Ok(Box::new(ApiResolver::new(api, retry.clone()))),
    }
}

/// Fetch a URL's body under the retry policy, demanding a success status
///
/// Every failure mode of an attempt — transport error, non-2xx status, body
/// read error — is retried until the budget runs out; exhaustion is reported
/// as [`ResolveError::RetriesExhausted`] carrying the last underlying error.
pub(crate) async fn fetch_body(
    client: &reqwest::Client,
    retry: &RetryConfig,
    url: &str,
) -> std::result::Result<String, ResolveError> {
    let attempts = retry.max_attempts.max(1);

    with_linear_backoff(retry, || async {
        let response =
            client
                .get(url)
                .send()
                .await
                .map_err(|e| ResolveError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| ResolveError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })
    })
    .await
    .map_err(|last| ResolveError::RetriesExhausted {
        attempts,
        last_error: last.to_string(),
    })
}
