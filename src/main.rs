//! Site-Binder main entry point
//!
//! This is the command-line interface for Site-Binder.

use anyhow::Context;
use clap::Parser;
use site_binder::config::{load_config_with_hash, validate, Config};
use site_binder::crawler::{run_binder, RunOutput};
use site_binder::extract::ExtractionMode;
use site_binder::output::{print_statistics, write_document, write_records};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Binder: crawl a site and bind its pages into one document
///
/// Site-Binder discovers the pages of a site breadth-first (or reads a URL
/// list), extracts the readable content of each page and assembles everything
/// into a single Markdown document with a table of contents.
#[derive(Parser, Debug)]
#[command(name = "site-binder")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a site and bind its pages into one document", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed URL to start discovery from
    #[arg(short, long, conflicts_with = "urls_file")]
    url: Option<String>,

    /// File with one URL per line; skips discovery
    #[arg(long, value_name = "FILE")]
    urls_file: Option<String>,

    /// Only keep URLs containing this substring
    #[arg(long)]
    filter: Option<String>,

    /// Maximum crawl depth
    #[arg(long)]
    depth: Option<u32>,

    /// Maximum number of pages
    #[arg(long)]
    limit: Option<usize>,

    /// Delay between requests to the same host (milliseconds)
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Number of pages processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Render pages in a headless browser
    #[arg(long)]
    browser: bool,

    /// Time given to page scripts before reading the page (milliseconds)
    #[arg(long, value_name = "MS")]
    wait_ms: Option<u64>,

    /// What to extract from each page
    #[arg(long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Free-text description of what to extract; picks the mode when --mode is absent
    #[arg(long, conflicts_with = "mode")]
    hint: Option<String>,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep one file per rendered page
    #[arg(long)]
    keep_parts: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_run(config, cli.output).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_binder=info,warn"),
            1 => EnvFilter::new("site_binder=debug,info"),
            2 => EnvFilter::new("site_binder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line values win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.crawl.seed_url = Some(url.clone());
        config.crawl.urls_file = None;
    }
    if let Some(path) = &cli.urls_file {
        config.crawl.urls_file = Some(path.clone());
        config.crawl.seed_url = None;
    }
    if let Some(filter) = &cli.filter {
        config.crawl.url_filter = Some(filter.clone());
    }
    if let Some(depth) = cli.depth {
        config.crawl.max_depth = depth;
    }
    if let Some(limit) = cli.limit {
        config.crawl.max_urls = limit;
    }
    if let Some(delay) = cli.delay_ms {
        config.crawl.inter_request_delay_ms = delay;
    }
    if let Some(workers) = cli.workers {
        config.crawl.workers = workers;
    }
    if cli.browser {
        config.fetch.use_scripting_fetch = true;
    }
    if let Some(wait) = cli.wait_ms {
        config.fetch.script_render_wait_ms = wait;
    }
    if let Some(mode) = cli.mode {
        config.extract.mode = mode;
    } else if let Some(hint) = &cli.hint {
        config.extract.mode = ExtractionMode::from_hint(hint);
        tracing::info!("Using {} mode for hint '{}'", config.extract.mode, hint);
    }
    if cli.keep_parts {
        config.output.keep_parts = true;
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Site-Binder Dry Run ===\n");

    println!("Source:");
    match (&config.crawl.seed_url, &config.crawl.urls_file) {
        (Some(seed), _) => println!("  Seed URL: {}", seed),
        (None, Some(path)) => println!("  URL list: {}", path),
        (None, None) => println!("  (none)"),
    }
    if let Some(filter) = &config.crawl.url_filter {
        println!("  Filter: {}", filter);
    }

    println!("\nCrawl Configuration:");
    println!("  Max depth: {}", config.crawl.max_depth);
    println!("  Max URLs: {}", config.crawl.max_urls);
    println!(
        "  Inter-request delay: {}ms",
        config.crawl.inter_request_delay_ms
    );
    println!("  Workers: {}", config.crawl.workers);
    if let Some(timeout) = config.crawl.run_timeout_secs {
        println!("  Run timeout: {}s", timeout);
    }

    println!("\nFetch:");
    println!(
        "  Fetcher: {}",
        if config.fetch.use_scripting_fetch {
            "headless browser"
        } else {
            "static HTTP"
        }
    );
    println!("  Timeout: {}ms", config.fetch.timeout_ms);
    if config.fetch.use_scripting_fetch {
        println!("  Script wait: {}ms", config.fetch.script_render_wait_ms);
    }

    println!("\nExtract:");
    println!("  Mode: {}", config.extract.mode);
    println!(
        "  Content selectors: {}",
        config.extract.content_selectors.len()
    );
    println!(
        "  Boilerplate selectors: {}",
        config.extract.boilerplate_selectors.len()
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Keep parts: {}", config.output.keep_parts);
    println!("  Keep intermediate: {}", config.output.keep_intermediate);

    println!("\n✓ Configuration is valid");
}

/// Handles the main run: discovery, extraction, assembly and writing output
async fn handle_run(config: Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, config.crawl.run_timeout_secs);

    let directory = PathBuf::from(&config.output.directory);
    let file_name = config.output.file_name.clone();
    let keep_parts = config.output.keep_parts;
    let mode = config.extract.mode;

    let report = match run_binder(config, cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    let mut summary = report.summary;
    let path = output.unwrap_or_else(|| {
        let name = file_name
            .unwrap_or_else(|| default_file_name(report.host.as_deref(), mode));
        directory.join(name)
    });

    match report.output {
        RunOutput::Document(document) => {
            write_document(&document, &path, keep_parts)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        RunOutput::Records(records) => {
            ensure_parent(&path)?;
            write_records(&path, records)?;
        }
    }

    summary.output_path = Some(path);
    print_statistics(&summary);
    Ok(())
}

/// Cancels the run on Ctrl-C or when the run timeout elapses
fn spawn_cancel_triggers(cancel: &CancellationToken, run_timeout_secs: Option<u64>) {
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; finishing with the pages completed so far");
            token.cancel();
        }
    });

    if let Some(seconds) = run_timeout_secs {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            tracing::warn!("Run timeout of {}s reached", seconds);
            token.cancel();
        });
    }
}

/// `{host}_{timestamp}.md`, or `.json` in details mode
fn default_file_name(host: Option<&str>, mode: ExtractionMode) -> String {
    let host = host.unwrap_or("site").replace(['.', ':'], "_");
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let extension = match mode {
        ExtractionMode::Document => "md",
        ExtractionMode::Details => "json",
    };
    format!("{}_{}.{}", host, timestamp, extension)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
