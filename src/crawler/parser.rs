//! HTML parser for discovering in-scope links
//!
//! This module turns the `<a href>` targets of a page into URL keys that stay on
//! the crawl's origin host.
//!
//! **Excluded:**
//! - `<a href="..." download>`
//! - Fragment-only, `javascript:`, `mailto:` and `tel:` references
//! - Targets with a denied binary extension
//! - Targets on any other host (subdomains included)

use crate::url::{is_same_host, Normalizer, UrlKey};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Discovers the in-scope link targets of a page
///
/// # Arguments
///
/// * `html` - The page HTML
/// * `base_url` - URL the page was served from, for resolving relative links
/// * `origin_host` - Lowercased host of the crawl's seed
/// * `normalizer` - Link normalizer with the run's extension denylist
///
/// # Returns
///
/// The distinct keys in first-seen order.
///
/// # Example
///
/// ```
/// use site_binder::crawler::discover_links;
/// use site_binder::url::Normalizer;
/// use url::Url;
///
/// let html = r#"<a href="/a">A</a><a href="/a#top">A again</a><a href="https://other.test/">x</a>"#;
/// let base = Url::parse("https://example.test/").unwrap();
/// let links = discover_links(html, &base, "example.test", &Normalizer::default());
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.test/a");
/// ```
pub fn discover_links(
    html: &str,
    base_url: &Url,
    origin_host: &str,
    normalizer: &Normalizer,
) -> Vec<UrlKey> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let key = match normalizer.normalize(href, base_url) {
            Ok(key) => key,
            Err(e) => {
                tracing::trace!("Skipping link '{}': {}", href, e);
                continue;
            }
        };

        let in_scope = key
            .to_url()
            .map(|url| is_same_host(&url, origin_host))
            .unwrap_or(false);

        if in_scope && seen.insert(key.clone()) {
            links.push(key);
        }
    }

    links
}
