//! API strategy: look the report up by the vehicle token in the listing URL

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ResolveOutcome, ResolvedTarget, TargetSource, fetch_body};
use crate::config::{ApiConfig, RetryConfig};
use crate::error::ResolveError;
use crate::normalizer::CanonicalUrl;

/// Resolves report URLs by extracting the vehicle token from the listing URL
/// and querying the backing lookup endpoint
pub struct ApiResolver {
    base_url: String,
    token_param: String,
    retry: RetryConfig,
}

impl ApiResolver {
    /// Build an API resolver from its config
    pub fn new(config: &ApiConfig, retry: RetryConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token_param: config.token_param.clone(),
            retry,
        }
    }

    /// The vehicle token carried by the listing URL, if any
    ///
    /// The parameter key is matched case-sensitively; an empty value counts
    /// as absent.
    fn token_from(&self, listing_url: &CanonicalUrl) -> Option<String> {
        listing_url
            .url()
            .query_pairs()
            .find(|(key, _)| key == self.token_param.as_str())
            .map(|(_, value)| value.into_owned())
            .filter(|token| !token.is_empty())
    }
}

/// Lookup endpoint response
///
/// Only the report URL field matters; anything else in the payload is
/// ignored. A missing field, a non-string value, or an empty string all mean
/// the same thing: no report for this vehicle.
#[derive(Debug, Deserialize)]
struct ReportLookup {
    #[serde(default, rename = "carfaxUrl")]
    carfax_url: Option<serde_json::Value>,
}

impl ReportLookup {
    fn report_url(&self) -> Option<&str> {
        self.carfax_url
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[async_trait]
impl TargetSource for ApiResolver {
    async fn resolve(
        &self,
        client: &reqwest::Client,
        listing_url: &CanonicalUrl,
    ) -> std::result::Result<ResolveOutcome, ResolveError> {
        let Some(token) = self.token_from(listing_url) else {
            debug!(listing = %listing_url, param = %self.token_param, "listing URL carries no vehicle token");
            return Ok(ResolveOutcome::NoToken);
        };

        let lookup_url = format!("{}{}", self.base_url, urlencoding::encode(&token));
        let body = fetch_body(client, &self.retry, &lookup_url).await?;

        let lookup: ReportLookup =
            serde_json::from_str(&body).map_err(|e| ResolveError::MalformedResponse {
                reason: e.to_string(),
            })?;

        match lookup.report_url() {
            Some(url) => {
                debug!(token = %token, report = %url, "report URL found via lookup API");
                Ok(ResolveOutcome::Resolved(ResolvedTarget {
                    url: url.to_string(),
                    token: Some(token),
                }))
            }
            None => {
                debug!(token = %token, "lookup API returned no report URL");
                Ok(ResolveOutcome::NoTargetFound)
            }
        }
    }
}
