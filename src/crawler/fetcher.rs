//! HTTP fetcher implementation
//!
//! This module defines the contract every fetcher satisfies and the static
//! HTTP fetcher built on reqwest:
//! - Building HTTP clients with the configured user agent and language
//! - Following redirects within a single call (max 10 hops)
//! - Rejecting non-2xx responses
//! - Decoding bodies with the declared or detected character encoding

use crate::config::FetchConfig;
use crate::extract::ScriptedPage;
use crate::url::UrlKey;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed within one fetch
pub const MAX_REDIRECTS: usize = 10;

/// How far into the body a `<meta charset>` declaration is looked for
const CHARSET_SNIFF_BYTES: usize = 1024;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// The key the page was requested under
    pub url: UrlKey,

    /// URL after redirects
    pub final_url: String,

    /// Decoded HTML
    pub body: String,

    /// Sections reported by the in-page script (script-executing fetch only)
    pub scripted: Option<ScriptedPage>,
}

/// Why a page could not be fetched
///
/// Every variant is a per-page failure: it is recorded and the run continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Fetches one page by URL key
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    ///
    /// A timeout is reported as [`FetchError::Timeout`] and treated exactly
    /// like any other fetch failure.
    async fn fetch(&self, url: &UrlKey, timeout: Duration) -> Result<FetchedDocument, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_binder::config::FetchConfig;
/// use site_binder::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Static fetcher: one GET per page, no script execution
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &UrlKey) -> Result<FetchedDocument, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedDocument {
            url: url.clone(),
            final_url,
            body: decode_body(&bytes, declared.as_deref()),
            scripted: None,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &UrlKey, timeout: Duration) -> Result<FetchedDocument, FetchError> {
        match tokio::time::timeout(timeout, self.get(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Network("Request timeout".to_string())
    } else if error.is_connect() {
        FetchError::Network("Connection refused".to_string())
    } else if error.is_redirect() {
        FetchError::Network(format!("Too many redirects (max {})", MAX_REDIRECTS))
    } else {
        FetchError::Network(error.to_string())
    }
}

/// Decodes `bytes` using the declared charset, a `<meta charset>`, or UTF-8
///
/// A byte order mark overrides all of them.
pub fn decode_body(bytes: &[u8], declared: Option<&str>) -> String {
    let encoding = declared
        .map(str::to_string)
        .or_else(|| sniff_meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "Body contained malformed sequences");
    }
    text.into_owned()
}

/// The `charset` parameter of a Content-Type header value
fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (name, label) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| label.trim().trim_matches('"').to_string())
    })
}

/// Looks for `charset=` in the first bytes of the document
fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();

    (!label.is_empty()).then_some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/html;Charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_sniff_meta_charset() {
        let html = br#"<html><head><meta charset="windows-1252"></head></html>"#;
        assert_eq!(sniff_meta_charset(html), Some("windows-1252".to_string()));

        let http_equiv =
            br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(sniff_meta_charset(http_equiv), Some("iso-8859-1".to_string()));

        assert_eq!(sniff_meta_charset(b"<html></html>"), None);
    }

    #[test]
    fn test_decode_declared_latin1() {
        // "Grüße" in ISO-8859-1
        let bytes = [0x47, 0x72, 0xFC, 0xDF, 0x65];
        assert_eq!(decode_body(&bytes, Some("iso-8859-1")), "Grüße");
    }

    #[test]
    fn test_decode_detected_meta_charset() {
        let mut bytes = b"<meta charset=\"iso-8859-1\"><p>".to_vec();
        bytes.push(0xE9); // é
        bytes.extend_from_slice(b"</p>");
        assert!(decode_body(&bytes, None).contains("<p>é</p>"));
    }

    #[test]
    fn test_decode_defaults_to_utf8() {
        assert_eq!(decode_body("Grüße".as_bytes(), None), "Grüße");
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        assert_eq!(decode_body("abc".as_bytes(), Some("no-such-charset")), "abc");
    }
}
