//! Report document retrieval
//!
//! Once a report URL is resolved, the document behind it is fetched with a
//! single best-effort attempt — no retry. A failure here degrades the record
//! to `DOWNLOAD_FAILED` but the resolved URL is kept; partial success is
//! never discarded.

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::DownloadError;
use crate::types::RetrievedDocument;

/// Fetch a resolved report document
///
/// The filename is derived from the VIN (sanitized, see
/// [`sanitize_identifier`]) plus an extension inferred from the response's
/// `Content-Type` header. The shared client's timeout bounds the request.
///
/// # Errors
///
/// Any transport failure or non-success status is a [`DownloadError`]
/// preserving the underlying cause.
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
    vin: &str,
) -> Result<RetrievedDocument, DownloadError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::Failed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::BadStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    let extension = extension_for(&content_type);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DownloadError::Failed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let file_name = format!("{}{}", sanitize_identifier(vin), extension);
    debug!(vin = %vin, file = %file_name, bytes = bytes.len(), "report document retrieved");

    Ok(RetrievedDocument {
        file_name,
        bytes: bytes.to_vec(),
    })
}

/// File extension for a (lower-cased) content type
///
/// Reports come back either as a PDF or as an HTML viewer page; anything
/// that does not declare itself a PDF is archived as HTML.
pub fn extension_for(content_type: &str) -> &'static str {
    if content_type.contains("pdf") {
        ".pdf"
    } else {
        ".html"
    }
}

/// Sanitize a VIN into a filesystem- and archive-safe filename stem
///
/// Every character that is not alphanumeric, `-`, or `_` becomes `_`.
pub fn sanitize_identifier(vin: &str) -> String {
    vin.chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // -----------------------------------------------------------------------
    // sanitize_identifier / extension_for
    // -----------------------------------------------------------------------

    #[test]
    fn sanitize_replaces_every_unsafe_character() {
        assert_eq!(sanitize_identifier("ABC 123/xyz#1"), "ABC_123_xyz_1");
    }

    #[test]
    fn sanitize_keeps_safe_characters_untouched() {
        assert_eq!(
            sanitize_identifier("1HGCM82633A004352"),
            "1HGCM82633A004352"
        );
        assert_eq!(sanitize_identifier("abc-DEF_123"), "abc-DEF_123");
    }

    #[test]
    fn extension_mapping_follows_the_content_type() {
        assert_eq!(extension_for("application/pdf"), ".pdf");
        assert_eq!(extension_for("application/x-pdf; charset=binary"), ".pdf");
        assert_eq!(extension_for("text/html; charset=utf-8"), ".html");
        assert_eq!(extension_for(""), ".html");
    }

    // -----------------------------------------------------------------------
    // fetch_document
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn pdf_content_type_yields_a_pdf_filename() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.7 fake".to_vec()),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let doc = fetch_document(&client, &format!("{}/r/1", server.uri()), "VIN 1")
            .await
            .unwrap();

        assert_eq!(doc.file_name, "VIN_1.pdf");
        assert_eq!(doc.bytes, b"%PDF-1.7 fake");
    }

    #[tokio::test]
    async fn html_content_type_yields_an_html_filename() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html; charset=utf-8")
                    .set_body_string("<html>viewer</html>"),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let doc = fetch_document(&client, &format!("{}/r/2", server.uri()), "ABC123")
            .await
            .unwrap();

        assert_eq!(doc.file_name, "ABC123.html");
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("bytes"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let doc = fetch_document(&client, &format!("{}/r/3", server.uri()), "ABC123")
            .await
            .unwrap();

        assert_eq!(doc.file_name, "ABC123.html");
    }

    #[tokio::test]
    async fn non_success_status_is_a_bad_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/4"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1) // single attempt, never retried
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_document(&client, &format!("{}/r/4", server.uri()), "ABC123")
            .await
            .unwrap_err();

        match err {
            DownloadError::BadStatus { status, .. } => assert_eq!(status, 404),
            other => panic!("expected BadStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_preserves_the_cause() {
        let client = reqwest::Client::new();
        let err = fetch_document(&client, "http://127.0.0.1:1/r/5", "ABC123")
            .await
            .unwrap_err();

        match err {
            DownloadError::Failed { reason, .. } => assert!(!reason.is_empty()),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
