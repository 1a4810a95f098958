//! Listing URL normalization and validation
//!
//! Inventory exports are messy: cells carry stray whitespace, quoting left
//! over from spreadsheet round-trips, `=HYPERLINK(...)` formulas, and bare
//! `www.` domains. [`normalize`] cleans a raw cell into a candidate URL;
//! [`CanonicalUrl`] is the validated form every downstream component works
//! with. Validation failure is decided locally — no network call is made for
//! a rejected cell.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Full-string match for spreadsheet hyperlink formulas, with or without the
/// optional label argument: `=HYPERLINK("<url>")` / `=HYPERLINK("<url>","<label>")`
static HYPERLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // the pattern is a compile-time constant; a parse failure is a bug
    #[allow(clippy::expect_used)]
    let pattern =
        Regex::new(r#"(?i)^=HYPERLINK\("([^"]+)"(?:,"[^"]*")?\)$"#).expect("hyperlink pattern");
    pattern
});

/// Clean a raw listing URL cell into a candidate URL
///
/// Handles, in order:
/// 1. `None` (missing cell) becomes the empty string
/// 2. surrounding whitespace and one layer of enclosing single/double quotes
/// 3. `=HYPERLINK("<url>"[,"<label>"])` formulas (case-insensitive,
///    full-string) are replaced by the captured URL, re-trimmed
/// 4. a leading `www.` gains an `https://` scheme
///
/// No validation happens here; see [`CanonicalUrl::parse`]. The function is
/// idempotent: normalizing an already-normalized value returns it unchanged.
pub fn normalize(raw: Option<&str>) -> String {
    let mut cleaned = strip_quotes(raw.unwrap_or("").trim()).trim().to_string();

    if let Some(captures) = HYPERLINK_RE.captures(&cleaned) {
        cleaned = captures[1].trim().to_string();
    }

    if cleaned.starts_with("www.") {
        cleaned = format!("https://{cleaned}");
    }

    cleaned
}

/// Whether a candidate URL passes canonical validation
pub fn is_valid_url(candidate: &str) -> bool {
    CanonicalUrl::parse(candidate).is_some()
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// A validated absolute http(s) URL with a non-empty host
///
/// The only constructor is [`CanonicalUrl::parse`]; holding one is proof the
/// URL is safe to hand to the network layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Validate a candidate URL
    ///
    /// Accepts only URLs that parse, use the `http` or `https` scheme, and
    /// carry a non-empty host. Everything else — including schemeless values
    /// that [`normalize`] left alone — is rejected with `None`.
    pub fn parse(candidate: &str) -> Option<Self> {
        let url = Url::parse(candidate).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => Some(Self(url)),
            _ => None,
        }
    }

    /// The validated URL as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The underlying parsed URL
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // normalize
    // -----------------------------------------------------------------------

    #[test]
    fn missing_cell_normalizes_to_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   ")), "");
    }

    #[test]
    fn whitespace_and_quotes_are_stripped() {
        assert_eq!(
            normalize(Some("  https://dealer.test/v/1  ")),
            "https://dealer.test/v/1"
        );
        assert_eq!(
            normalize(Some("\"https://dealer.test/v/1\"")),
            "https://dealer.test/v/1"
        );
        assert_eq!(
            normalize(Some("'https://dealer.test/v/1'")),
            "https://dealer.test/v/1"
        );
    }

    #[test]
    fn hyperlink_formula_is_unwrapped() {
        assert_eq!(
            normalize(Some(r#"=HYPERLINK("https://x.test/a","label")"#)),
            "https://x.test/a"
        );
        assert_eq!(
            normalize(Some(r#"=HYPERLINK("https://x.test/a")"#)),
            "https://x.test/a"
        );
    }

    #[test]
    fn hyperlink_formula_matches_case_insensitively() {
        assert_eq!(
            normalize(Some(r#"=hyperlink("https://x.test/a","l")"#)),
            "https://x.test/a"
        );
    }

    #[test]
    fn hyperlink_formula_must_span_the_whole_cell() {
        // A formula embedded in other text is left alone
        let partial = r#"see =HYPERLINK("https://x.test/a") for details"#;
        assert_eq!(normalize(Some(partial)), partial);
    }

    #[test]
    fn bare_www_domain_gains_https() {
        assert_eq!(
            normalize(Some("www.example.test/a")),
            "https://www.example.test/a"
        );
    }

    #[test]
    fn hyperlink_formula_with_www_url_gets_both_treatments() {
        assert_eq!(
            normalize(Some(r#"=HYPERLINK("www.example.test/a","car")"#)),
            "https://www.example.test/a"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "https://dealer.test/v/1",
            "www.example.test/a",
            r#"=HYPERLINK("https://x.test/a","label")"#,
            "  'https://quoted.test'  ",
            "not a url",
        ];
        for input in inputs {
            let once = normalize(Some(input));
            let twice = normalize(Some(once.as_str()));
            assert_eq!(once, twice, "normalization not idempotent for {input:?}");
        }
    }

    // -----------------------------------------------------------------------
    // CanonicalUrl / is_valid_url
    // -----------------------------------------------------------------------

    #[test]
    fn http_and_https_urls_validate() {
        assert!(is_valid_url("https://dealer.test/v/1"));
        assert!(is_valid_url("http://dealer.test/v/1?VID=abc"));
    }

    #[test]
    fn schemeless_and_garbage_values_are_rejected() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("dealer.test/v/1"));
        assert!(!is_valid_url("ftp://dealer.test/v/1"));
        assert!(!is_valid_url("file:///etc/passwd"));
    }

    #[test]
    fn canonical_url_preserves_the_query() {
        let url = CanonicalUrl::parse("https://dealer.test/v/1?VID=abc123").unwrap();
        assert_eq!(url.url().query(), Some("VID=abc123"));
        assert!(url.as_str().contains("VID=abc123"));
    }

    #[test]
    fn normalized_www_value_round_trips_into_a_canonical_url() {
        let normalized = normalize(Some("www.example.test/a"));
        let url = CanonicalUrl::parse(&normalized).unwrap();
        assert_eq!(url.as_str(), "https://www.example.test/a");
    }
}
