//! Crawl frontier for breadth-first URL discovery
//!
//! This module handles:
//! - The FIFO queue of `(url, depth)` entries awaiting expansion
//! - The permanent visited set, with atomic check-and-insert
//! - The soft cap on visited URLs and the depth bound
//! - The crawl state machine `Idle -> Running -> {Completed, Aborted}`

use crate::url::{filter_and_truncate, UrlKey};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: UrlKey,
    pub depth: u32,
}

/// Lifecycle of one discovery crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl CrawlState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }

    fn can_become(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Aborted)
        )
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Frontier misuse
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrontierError {
    #[error("Invalid crawl state transition: {from} -> {to}")]
    InvalidTransition { from: CrawlState, to: CrawlState },
}

/// Breadth-first work queue plus visited set
///
/// The frontier is owned by a single task, so checking and inserting into the
/// visited set is one step and no key is ever enqueued twice.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<UrlKey>,
    /// Visited keys in insertion order
    order: Vec<UrlKey>,
    state: CrawlState,
    max_depth: u32,
    soft_cap: usize,
}

impl Frontier {
    /// Creates an idle frontier
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Entries at this depth or deeper are dropped unexpanded
    /// * `max_urls` - Final URL budget; traversal stops once twice as many are visited
    pub fn new(max_depth: u32, max_urls: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            order: Vec::new(),
            state: CrawlState::Idle,
            max_depth,
            soft_cap: max_urls.saturating_mul(2),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Enqueues the seed at depth 0, marks it visited and starts the crawl
    pub fn seed(&mut self, url: UrlKey) -> Result<(), FrontierError> {
        self.transition(CrawlState::Running)?;
        self.offer(url, 0);
        Ok(())
    }

    /// Adds `url` at `depth` unless it was ever visited
    ///
    /// Returns true if the URL was new.
    pub fn offer(&mut self, url: UrlKey, depth: u32) -> bool {
        if !self.visited.insert(url.clone()) {
            return false;
        }
        self.order.push(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Dequeues the next entry to expand
    ///
    /// Returns None once the crawl should stop: the queue is empty, the soft
    /// cap is reached, or the crawl is no longer running. Entries at or past
    /// the depth bound are skipped here; they stay visited.
    pub fn next_entry(&mut self) -> Option<FrontierEntry> {
        if self.state != CrawlState::Running {
            return None;
        }

        loop {
            if self.visited.len() >= self.soft_cap {
                tracing::debug!(
                    visited = self.visited.len(),
                    cap = self.soft_cap,
                    "Visited soft cap reached"
                );
                return None;
            }

            let entry = self.queue.pop_front()?;
            if entry.depth >= self.max_depth {
                tracing::trace!(url = %entry.url, depth = entry.depth, "Not expanding");
                continue;
            }
            return Some(entry);
        }
    }

    /// Marks the traversal as finished normally
    pub fn finish(&mut self) -> Result<(), FrontierError> {
        self.transition(CrawlState::Completed)
    }

    /// Marks the traversal as cancelled and drops the pending queue
    pub fn abort(&mut self) -> Result<(), FrontierError> {
        self.transition(CrawlState::Aborted)?;
        self.queue.clear();
        Ok(())
    }

    /// Visited keys, filtered by `filter` then truncated to `max_urls`
    ///
    /// Filtering happens only here, after traversal, so the filter never
    /// changes which pages are expanded.
    pub fn into_discovered(self, filter: Option<&str>, max_urls: usize) -> Vec<UrlKey> {
        filter_and_truncate(self.order, filter, max_urls)
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), FrontierError> {
        if !self.state.can_become(next) {
            return Err(FrontierError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "Crawl state change");
        self.state = next;
        Ok(())
    }
}
