use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None. Ports are not part of the host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_binder::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.test:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.test".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when `url` lives on `origin_host`
///
/// `origin_host` is expected to be lowercase, as produced by [`extract_host`].
pub fn is_same_host(url: &Url, origin_host: &str) -> bool {
    extract_host(url).as_deref() == Some(origin_host)
}
