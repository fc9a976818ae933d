//! Configuration module for Site-Binder
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) is a valid
//! configuration once a seed URL or URL list is supplied.
//!
//! # Example
//!
//! ```no_run
//! use site_binder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("binder.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawl.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, ExtractConfig, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
