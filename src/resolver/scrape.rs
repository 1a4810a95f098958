//! Scrape strategy: pull the report anchor out of the listing page

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use super::{ResolveOutcome, ResolvedTarget, TargetSource, fetch_body};
use crate::config::{RetryConfig, ScrapeConfig};
use crate::error::{Error, ResolveError, Result};
use crate::normalizer::CanonicalUrl;

/// Resolves report URLs by fetching the listing page and matching the report
/// anchor with a CSS selector
pub struct ScrapeResolver {
    selector: Selector,
    retry: RetryConfig,
}

impl ScrapeResolver {
    /// Build a scrape resolver from its config
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configured CSS selector does not
    /// parse.
    pub fn new(config: &ScrapeConfig, retry: RetryConfig) -> Result<Self> {
        let selector = Selector::parse(&config.link_selector).map_err(|e| Error::Config {
            message: format!(
                "invalid link selector {:?}: {e}",
                config.link_selector.as_str()
            ),
            key: Some("link_selector".to_string()),
        })?;
        Ok(Self { selector, retry })
    }
}

#[async_trait]
impl TargetSource for ScrapeResolver {
    async fn resolve(
        &self,
        client: &reqwest::Client,
        listing_url: &CanonicalUrl,
    ) -> std::result::Result<ResolveOutcome, ResolveError> {
        let body = fetch_body(client, &self.retry, listing_url.as_str()).await?;

        match first_anchor_href(&body, &self.selector) {
            Some(href) => {
                debug!(listing = %listing_url, report = %href, "report anchor found");
                Ok(ResolveOutcome::Resolved(ResolvedTarget {
                    url: href,
                    token: None,
                }))
            }
            None => {
                debug!(listing = %listing_url, "no report anchor on listing page");
                Ok(ResolveOutcome::NoTargetLink)
            }
        }
    }
}

/// Trimmed `href` of the first element matching the selector
///
/// Mirrors the page contract: only the first match is considered; a match
/// without an `href`, or with an empty one, counts as no link at all.
fn first_anchor_href(body: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(body);
    let element = document.select(selector).next()?;
    let href = element.value().attr("href")?.trim();
    (!href.is_empty()).then(|| href.to_string())
}
