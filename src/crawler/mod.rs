//! Crawler module for page discovery and fetching
//!
//! This module contains the core crawling logic, including:
//! - The fetcher contract with static HTTP and headless browser implementations
//! - Link discovery restricted to the seed's host
//! - The breadth-first frontier and per-host request pacing
//! - Overall run coordination

mod browser;
mod coordinator;
mod fetcher;
mod frontier;
mod pacer;
mod parser;

pub use browser::{BrowserFetcher, BrowserSession};
pub use coordinator::{load_url_list, parse_url_list, run_binder, Coordinator, RunOutput, RunReport};
pub use fetcher::{
    build_http_client, decode_body, FetchError, FetchedDocument, Fetcher, HttpFetcher,
    MAX_REDIRECTS,
};
pub use frontier::{CrawlState, Frontier, FrontierEntry, FrontierError};
pub use pacer::HostPacer;
pub use parser::discover_links;
