//! State module for tracking run progress
//!
//! This module provides state management for pages and hosts during a run.
//!
//! # Components
//!
//! - `PageState`: Lifecycle of one page through fetch, extraction and rendering
//! - `HostState`: Per-host request pacing and counting

mod host_state;
mod page_state;

// Re-export main types
pub use host_state::HostState;
pub use page_state::PageState;
