//! URL handling module for Site-Binder
//!
//! This module provides link normalization into canonical [`UrlKey`]s, host
//! extraction for same-origin checks, and substring filtering of discovered URLs.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, is_same_host};
pub use matcher::matches_filter;
pub use normalize::{normalize, normalize_seed, Normalizer, UrlKey, DEFAULT_EXCLUDED_EXTENSIONS};

/// Keeps the keys matching `filter` (if any), then truncates to `max`
///
/// Order is preserved, so the first `max` matches in discovery order survive.
pub fn filter_and_truncate(keys: Vec<UrlKey>, filter: Option<&str>, max: usize) -> Vec<UrlKey> {
    keys.into_iter()
        .filter(|key| filter.map_or(true, |f| matches_filter(f, key.as_str())))
        .take(max)
        .collect()
}
