use crate::extract::ExtractionMode;
use crate::url::DEFAULT_EXCLUDED_EXTENSIONS;
use serde::Deserialize;

/// Main configuration structure for Site-Binder
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// URL discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Starting URL for the crawl
    #[serde(rename = "seed-url", default)]
    pub seed_url: Option<String>,

    /// File with one URL per line; replaces discovery when set
    #[serde(rename = "urls-file", default)]
    pub urls_file: Option<String>,

    /// Only keep discovered URLs containing this substring (case-insensitive)
    #[serde(rename = "url-filter", default)]
    pub url_filter: Option<String>,

    /// Maximum depth to crawl from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of URLs kept after discovery
    #[serde(rename = "max-urls", default = "default_max_urls")]
    pub max_urls: usize,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "inter-request-delay-ms", default = "default_delay_ms")]
    pub inter_request_delay_ms: u64,

    /// Number of pages fetched, extracted and rendered concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Global deadline for the whole run (seconds)
    #[serde(rename = "run-timeout-secs", default)]
    pub run_timeout_secs: Option<u64>,

    /// Link targets whose path ends with one of these are never followed
    #[serde(rename = "excluded-extensions", default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,
}

/// Fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Render pages in a headless browser before extraction
    #[serde(rename = "use-scripting-fetch", default)]
    pub use_scripting_fetch: bool,

    /// Time given to page scripts before the DOM is read (milliseconds)
    #[serde(rename = "script-render-wait-ms", default = "default_script_wait_ms")]
    pub script_render_wait_ms: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub mode: ExtractionMode,

    /// Content-root candidates, tried in order
    #[serde(rename = "content-selectors", default = "default_content_selectors")]
    pub content_selectors: Vec<String>,

    /// Subtrees removed before classification
    #[serde(rename = "boilerplate-selectors", default = "default_boilerplate_selectors")]
    pub boilerplate_selectors: Vec<String>,

    /// The document title is cut at the first separator found
    #[serde(rename = "title-separators", default = "default_title_separators")]
    pub title_separators: Vec<String>,

    /// A content-root candidate must hold more text than this (characters)
    #[serde(rename = "min-root-text", default = "default_min_root_text")]
    pub min_root_text: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the final document and any kept parts
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Final document name; derived from the host and a timestamp when absent
    #[serde(rename = "file-name", default)]
    pub file_name: Option<String>,

    /// Keep one artifact file per rendered page
    #[serde(rename = "keep-parts", default)]
    pub keep_parts: bool,

    /// Write each extracted page as JSON next to the parts
    #[serde(rename = "keep-intermediate", default)]
    pub keep_intermediate: bool,

    /// Per-page render timeout (milliseconds)
    #[serde(rename = "render-timeout-ms", default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_urls() -> usize {
    50
}

fn default_delay_ms() -> u64 {
    1500
}

fn default_workers() -> usize {
    1
}

fn default_excluded_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_script_wait_ms() -> u64 {
    3000
}

fn default_fetch_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_accept_language() -> String {
    "de-DE,de;q=0.9,en;q=0.8".to_string()
}

fn default_content_selectors() -> Vec<String> {
    [
        "main article",
        "main .content",
        "article",
        "main",
        ".docs-content",
        ".doc-content",
        ".markdown-body",
        ".post-content",
        ".entry-content",
        ".article-content",
        ".page-content",
        "[role=\"main\"]",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_boilerplate_selectors() -> Vec<String> {
    [
        "script",
        "style",
        "noscript",
        "iframe",
        "nav",
        "header",
        "footer",
        "aside",
        ".sidebar",
        ".menu",
        ".navigation",
        ".nav",
        ".comments",
        ".ad",
        ".advertisement",
        ".cookie-banner",
        ".popup",
        ".modal",
        "[role=\"navigation\"]",
        "[role=\"banner\"]",
        ".toc",
        ".table-of-contents",
        ".on-this-page",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_title_separators() -> Vec<String> {
    vec![" - ".to_string(), " | ".to_string()]
}

fn default_min_root_text() -> usize {
    100
}

fn default_output_directory() -> String {
    ".tmp/site_binder".to_string()
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            urls_file: None,
            url_filter: None,
            max_depth: default_max_depth(),
            max_urls: default_max_urls(),
            inter_request_delay_ms: default_delay_ms(),
            workers: default_workers(),
            run_timeout_secs: None,
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_scripting_fetch: false,
            script_render_wait_ms: default_script_wait_ms(),
            timeout_ms: default_fetch_timeout_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            content_selectors: default_content_selectors(),
            boilerplate_selectors: default_boilerplate_selectors(),
            title_separators: default_title_separators(),
            min_root_text: default_min_root_text(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file_name: None,
            keep_parts: false,
            keep_intermediate: false,
            render_timeout_ms: default_render_timeout_ms(),
        }
    }
}
