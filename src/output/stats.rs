//! Run summary and statistics
//!
//! This module collects the per-page outcomes of a run and prints them in the
//! same report style as the rest of the CLI.

use crate::crawler::CrawlState;
use crate::state::PageState;
use crate::url::UrlKey;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

/// Outcome of one page in the pipeline
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub url: UrlKey,
    pub state: PageState,
    /// Failure or skip reason
    pub detail: Option<String>,
}

/// Everything reported at the end of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// State of URL discovery; None when URLs came from a list file
    pub crawl_state: Option<CrawlState>,

    /// URLs kept after filtering and truncation
    pub urls_discovered: usize,

    /// URLs fetched during discovery, including failures
    pub discovery_fetches: usize,

    /// Fetch failures during discovery
    pub discovery_failures: usize,

    /// Outcome of every page that entered the pipeline, in processing order
    pub outcomes: Vec<PageOutcome>,

    /// Pages in the final document
    pub pages_assembled: usize,

    /// Set when the run was cancelled or timed out
    pub cancelled: bool,

    /// Where the final document or record export was written
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            crawl_state: None,
            urls_discovered: 0,
            discovery_fetches: 0,
            discovery_failures: 0,
            outcomes: Vec::new(),
            pages_assembled: 0,
            cancelled: false,
            output_path: None,
        }
    }

    pub fn record(&mut self, url: UrlKey, state: PageState, detail: Option<String>) {
        self.outcomes.push(PageOutcome { url, state, detail });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Page count per state, zero counts omitted
    pub fn pages_by_state(&self) -> HashMap<PageState, usize> {
        let mut counts = HashMap::new();
        for outcome in &self.outcomes {
            *counts.entry(outcome.state).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, state: PageState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.state.is_success()).count()
    }

    pub fn errors(&self) -> usize {
        self.outcomes.iter().filter(|o| o.state.is_error()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.state.is_skipped()).count()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints the summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The run summary to display
pub fn print_statistics(summary: &RunSummary) {
    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(seconds) = summary.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    match summary.crawl_state {
        Some(state) => println!("  Discovery: {}", state),
        None => println!("  Discovery: skipped (URL list)"),
    }
    println!("  URLs discovered: {}", summary.urls_discovered);
    if summary.discovery_fetches > 0 {
        println!(
            "  Discovery fetches: {} ({} failed)",
            summary.discovery_fetches, summary.discovery_failures
        );
    }
    if summary.cancelled {
        println!("  Run was cancelled; output is partial");
    }
    println!();

    let total = summary.outcomes.len();
    println!("Pages by State:");
    let mut state_counts: Vec<_> = summary.pages_by_state().into_iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.label().cmp(b.0.label())));

    for (state, count) in state_counts {
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    let failures: Vec<&PageOutcome> = summary
        .outcomes
        .iter()
        .filter(|o| o.state.is_error())
        .collect();
    if !failures.is_empty() {
        println!("Failed Pages ({}):", failures.len());
        for outcome in failures {
            match &outcome.detail {
                Some(detail) => println!("  - {} ({})", outcome.url, detail),
                None => println!("  - {}", outcome.url),
            }
        }
        println!();
    }

    let success_rate = if total > 0 {
        (summary.successes() as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} pages, {} skipped, {} failed)",
        success_rate,
        summary.successes(),
        total,
        summary.skipped(),
        summary.errors()
    );

    if let Some(path) = &summary.output_path {
        println!("Output: {}", path.display());
    }
}
