//! Configuration types for carfax-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for [`crate::CarfaxFetcher`]
///
/// Fields are organized into logical sub-configs:
/// - [`http`](HttpConfig) — fixed request headers and the request timeout
/// - [`retry`](RetryConfig) — retry budget for the primary listing fetch
/// - [`pacing`](PacingConfig) — per-record politeness delay
/// - [`resolver`](ResolverConfig) — which resolution strategy to use
/// - [`columns`](ColumnSpec) — caller-designated input column names
///
/// Everything has a sensible default; a `Config::default()` runner scrapes
/// listing pages for a report anchor and appends a `CARFAX_URL` column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Fixed HTTP header set and request timeout
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry policy for the primary listing fetch
    #[serde(default)]
    pub retry: RetryConfig,

    /// Per-record pacing delay
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Resolution strategy (scrape the listing page, or call the backing API)
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Caller-designated input column names
    #[serde(default)]
    pub columns: ColumnSpec,

    /// Header of the resolved-URL column appended to the enriched table
    /// (default: "CARFAX_URL")
    #[serde(default = "default_resolved_column")]
    pub resolved_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            resolver: ResolverConfig::default(),
            columns: ColumnSpec::default(),
            resolved_column: default_resolved_column(),
        }
    }
}

/// Fixed HTTP header set and request timeout
///
/// Every request carries a realistic browser user agent and a same-site
/// referer; the listing origin rejects bare client fetches without them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header sent with every request
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Accept-Language header sent with every request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Referer header sent with every request
    ///
    /// The eBrochure endpoint expects a same-site referer.
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_secs_serde")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            referer: default_referer(),
            timeout: default_timeout(),
        }
    }
}

/// Retry configuration for the primary listing fetch
///
/// Only the primary fetch is retried. Report document downloads are
/// best-effort single attempts (see [`crate::fetcher`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, first try included (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for linear backoff; attempt `n` sleeps `base * n`
    /// before retrying (default: 1500 ms)
    #[serde(default = "default_backoff_base", with = "duration_ms_serde")]
    pub backoff_base: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
        }
    }
}

/// Per-record pacing delay
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay after each record that touched the network (default: 300 ms)
    ///
    /// Records rejected before any network call do not pace.
    #[serde(default = "default_record_delay", with = "duration_ms_serde")]
    pub record_delay: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            record_delay: default_record_delay(),
        }
    }
}

/// Resolution strategy selection
///
/// Fixed for the lifetime of a runner — a batch never mixes strategies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// Fetch the listing page and scrape the report anchor out of the HTML
    Scrape(ScrapeConfig),
    /// Extract a vehicle token from the listing URL and ask the backing API
    Api(ApiConfig),
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::Scrape(ScrapeConfig::default())
    }
}

/// Scrape-strategy settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// CSS selector for the report anchor on the listing page
    /// (default: `a.j-carfax-link`)
    #[serde(default = "default_link_selector")]
    pub link_selector: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            link_selector: default_link_selector(),
        }
    }
}

/// API-strategy settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base endpoint the URL-encoded vehicle token is appended to
    pub base_url: String,

    /// Query parameter on the listing URL that carries the vehicle token.
    /// Matched case-sensitively (default: "VID")
    #[serde(default = "default_token_param")]
    pub token_param: String,
}

/// Caller-designated input column names
///
/// The surrounding presentation layer decides which columns hold the
/// listing URL and the VIN; the library never guesses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column holding the raw listing URL (default: "EBROCHURE_URL")
    #[serde(default = "default_listing_url_column")]
    pub listing_url: String,

    /// Column holding the VIN, used for filenames and the enrichment join
    /// (default: "VIN")
    #[serde(default = "default_vin_column")]
    pub vin: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url_column(),
            vin: default_vin_column(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_referer() -> String {
    "https://www.autonation.com/".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> Duration {
    Duration::from_millis(1500)
}

fn default_record_delay() -> Duration {
    Duration::from_millis(300)
}

fn default_link_selector() -> String {
    "a.j-carfax-link".to_string()
}

fn default_token_param() -> String {
    "VID".to_string()
}

fn default_listing_url_column() -> String {
    "EBROCHURE_URL".to_string()
}

fn default_vin_column() -> String {
    "VIN".to_string()
}

fn default_resolved_column() -> String {
    "CARFAX_URL".to_string()
}

// Duration serialization helper (whole seconds)
mod duration_secs_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds, for sub-second delays)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_documented_knobs() {
        let config = Config::default();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_base, Duration::from_millis(1500));
        assert_eq!(config.pacing.record_delay, Duration::from_millis(300));
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert_eq!(config.columns.listing_url, "EBROCHURE_URL");
        assert_eq!(config.columns.vin, "VIN");
        assert_eq!(config.resolved_column, "CARFAX_URL");
        assert!(matches!(config.resolver, ResolverConfig::Scrape(_)));
    }

    #[test]
    fn default_headers_look_like_a_browser() {
        let http = HttpConfig::default();

        assert!(http.user_agent.starts_with("Mozilla/5.0"));
        assert!(http.accept.contains("text/html"));
        assert!(http.accept_language.starts_with("en-US"));
        assert!(http.referer.starts_with("https://"));
    }

    #[test]
    fn empty_json_object_deserializes_to_full_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.columns.vin, "VIN");
    }

    #[test]
    fn resolver_config_round_trips_through_the_strategy_tag() {
        let api = ResolverConfig::Api(ApiConfig {
            base_url: "https://api.example.test/report?vid=".to_string(),
            token_param: default_token_param(),
        });

        let json = serde_json::to_string(&api).unwrap();
        assert!(json.contains(r#""strategy":"api""#), "json: {json}");

        let back: ResolverConfig = serde_json::from_str(&json).unwrap();
        match back {
            ResolverConfig::Api(cfg) => {
                assert_eq!(cfg.base_url, "https://api.example.test/report?vid=");
                assert_eq!(cfg.token_param, "VID");
            }
            other => panic!("expected api strategy, got {other:?}"),
        }
    }

    #[test]
    fn durations_serialize_in_their_documented_units() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();

        // timeout in whole seconds, delays in milliseconds
        assert_eq!(json["http"]["timeout"], 30);
        assert_eq!(json["retry"]["backoff_base"], 1500);
        assert_eq!(json["pacing"]["record_delay"], 300);
    }
}
