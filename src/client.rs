//! Shared HTTP client construction
//!
//! One `reqwest::Client` is built per runner and passed by reference into
//! every component, so connection pooling and the fixed header set are reused
//! across all fetches in a batch. The client is never stored in a global.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Build the shared HTTP client from the configured header set
///
/// Redirects are followed (reqwest's default policy) and the configured
/// timeout bounds every request end to end, body read included.
///
/// # Errors
///
/// Returns [`Error::Config`] when a configured header value is not a valid
/// HTTP header, or when the client itself cannot be constructed.
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("user_agent", &http.user_agent)?);
    headers.insert(ACCEPT, header_value("accept", &http.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept_language", &http.accept_language)?,
    );
    headers.insert(REFERER, header_value("referer", &http.referer)?);

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(http.timeout)
        .build()
        .map_err(|e| Error::Config {
            message: format!("failed to build HTTP client: {e}"),
            key: None,
        })
}

fn header_value(key: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Config {
        message: format!("invalid {key} header value: {e}"),
        key: Some(key.to_string()),
    })
}
