//! Site-Binder: crawl a site and bind its pages into one document
//!
//! This crate discovers the pages of a site (or takes an explicit list of URLs),
//! extracts a typed sequence of content blocks from each page, and assembles the
//! results into a single document with a table of contents.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for run-level failures
///
/// Per-page problems (fetch failures, empty extraction, render failures) never
/// surface here; they are counted in the run summary instead.
#[derive(Debug, Error)]
pub enum BinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("No URLs to process")]
    NoUrls,

    #[error("Crawl state error: {0}")]
    Frontier(#[from] crawler::FrontierError),

    #[error("Assembly failed: {0}")]
    Assembly(#[from] output::AssemblyError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Why a link reference was refused by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    FragmentOnly,
    Script,
    Mailto,
    Tel,
    BinaryExtension,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Empty => "empty reference",
            Self::FragmentOnly => "fragment-only reference",
            Self::Script => "javascript: pseudo-URL",
            Self::Mailto => "mailto: link",
            Self::Tel => "tel: link",
            Self::BinaryExtension => "binary file extension",
        };
        f.write_str(text)
    }
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Rejected link: {0}")]
    Rejected(RejectReason),
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, BinderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{ContentBlock, PageResult};
pub use output::FinalDocument;
pub use url::{normalize, UrlKey};
