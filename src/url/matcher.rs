/// Checks if a URL contains a filter substring, ignoring case
///
/// An empty filter matches everything.
///
/// # Examples
///
/// ```
/// use site_binder::url::matches_filter;
///
/// assert!(matches_filter("/Videos/", "https://example.test/videos/intro"));
/// assert!(!matches_filter("/videos/", "https://example.test/blog/post"));
/// ```
pub fn matches_filter(filter: &str, candidate: &str) -> bool {
    filter.is_empty() || candidate.to_lowercase().contains(&filter.to_lowercase())
}
