use crate::{RejectReason, UrlError};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Binary resources that are never worth crawling
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".zip", ".svg", ".webp", ".mp4", ".mp3",
];

/// Canonical identity of a page
///
/// Two link references that resolve to the same resource, ignoring the fragment
/// and a single trailing slash, produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlKey(String);

impl UrlKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into a `Url`
    ///
    /// Keys are only built from parsed URLs, so this cannot fail for keys made
    /// by [`normalize`]; the `Result` covers keys deserialized from elsewhere.
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(e.to_string()))
    }

    /// Lowercased host of the key, if it has one
    pub fn host(&self) -> Option<String> {
        self.to_url().ok().as_ref().and_then(super::extract_host)
    }

    /// Path of the key, `/` for the site root
    pub fn path(&self) -> String {
        self.to_url()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }
}

impl fmt::Display for UrlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UrlKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Link normalizer with a configurable extension denylist
#[derive(Debug, Clone)]
pub struct Normalizer {
    excluded_extensions: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|s| s.to_string()))
    }
}

impl Normalizer {
    pub fn new<I, S>(excluded_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_extensions: excluded_extensions
                .into_iter()
                .map(|e| e.into().to_lowercase())
                .collect(),
        }
    }

    /// Normalizes a seed or list entry, adding `https://` when no scheme is given
    pub fn normalize_seed(&self, raw: &str) -> Result<UrlKey, UrlError> {
        let raw = raw.trim();
        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };
        let url =
            Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
        self.normalize(url.as_str(), &url)
    }

    /// Canonicalizes a raw link reference into a [`UrlKey`]
    ///
    /// # Normalization Steps
    ///
    /// 1. Reject empty, fragment-only, `javascript:`, `mailto:` and `tel:` references
    /// 2. Resolve against `base`: `/path` against its origin, `path` against the
    ///    page itself, absolute references as-is
    /// 3. Reject non-HTTP(S) results and paths ending in a denied extension
    /// 4. Drop the fragment
    /// 5. Drop exactly one trailing slash (the root path `/` is kept)
    ///
    /// Scheme, host, path and query are otherwise preserved. No scope check is
    /// made here; that belongs to link discovery.
    pub fn normalize(&self, raw_href: &str, base: &Url) -> Result<UrlKey, UrlError> {
        let href = raw_href.trim();

        if href.is_empty() {
            return Err(UrlError::Rejected(RejectReason::Empty));
        }
        if href.starts_with('#') {
            return Err(UrlError::Rejected(RejectReason::FragmentOnly));
        }

        let lowered = href.to_ascii_lowercase();
        if lowered.starts_with("javascript:") {
            return Err(UrlError::Rejected(RejectReason::Script));
        }
        if lowered.starts_with("mailto:") {
            return Err(UrlError::Rejected(RejectReason::Mailto));
        }
        if lowered.starts_with("tel:") {
            return Err(UrlError::Rejected(RejectReason::Tel));
        }

        let mut url = base
            .join(href)
            .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost);
        }

        if self.has_excluded_extension(url.path()) {
            return Err(UrlError::Rejected(RejectReason::BinaryExtension));
        }

        url.set_fragment(None);

        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path[..path.len() - 1].to_string();
            url.set_path(&trimmed);
        }

        Ok(UrlKey(url.to_string()))
    }

    fn has_excluded_extension(&self, path: &str) -> bool {
        let path = path.to_ascii_lowercase();
        let path = path.trim_end_matches('/');
        self.excluded_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}

/// Normalizes with the default extension denylist
///
/// # Examples
///
/// ```
/// use site_binder::url::normalize;
/// use url::Url;
///
/// let base = Url::parse("https://example.test/docs/intro").unwrap();
/// let key = normalize("../guide/#install", &base).unwrap();
/// assert_eq!(key.as_str(), "https://example.test/guide");
/// ```
pub fn normalize(raw_href: &str, base: &Url) -> Result<UrlKey, UrlError> {
    Normalizer::default().normalize(raw_href, base)
}

/// Normalizes a seed or list entry with the default extension denylist
pub fn normalize_seed(raw: &str) -> Result<UrlKey, UrlError> {
    Normalizer::default().normalize_seed(raw)
}
