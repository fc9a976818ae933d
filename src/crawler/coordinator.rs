//! Run coordinator - discovery loop and page pipeline
//!
//! This module contains the orchestration of one run:
//! - Resolving the URL set, by breadth-first discovery or from a list file
//! - Fetching, extracting and rendering pages on a bounded worker pool
//! - Keeping results in processing order for the document assembler
//! - Honouring cancellation by flushing completed pages into a partial document

use crate::config::Config;
use crate::crawler::browser::{BrowserFetcher, BrowserSession};
use crate::crawler::fetcher::{FetchError, FetchedDocument, Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::pacer::HostPacer;
use crate::crawler::parser::discover_links;
use crate::extract::{extract_details, extract_page, ExtractionMode, PageResult, StructuralExtractor};
use crate::output::{sanitize_path, Assembler, Assembly, FinalDocument, PageArtifact, PageRecord, RunSummary};
use crate::state::PageState;
use crate::url::{filter_and_truncate, Normalizer, UrlKey};
use crate::BinderError;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a run produced
#[derive(Debug)]
pub enum RunOutput {
    /// Document mode: the assembled document
    Document(FinalDocument),
    /// Details mode: one record per page, in processing order
    Records(Vec<PageRecord>),
}

/// Result of a completed (or cancelled) run
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub output: RunOutput,
    /// Host of the first processed URL, used to name the output file
    pub host: Option<String>,
}

/// One page after the pipeline, before it is handed to the assembler
struct ProcessedPage {
    url: UrlKey,
    state: PageState,
    detail: Option<String>,
    page: Option<PageResult>,
    artifact: Option<PageArtifact>,
    record: Option<PageRecord>,
}

impl ProcessedPage {
    fn new(url: UrlKey, state: PageState) -> Self {
        Self {
            url,
            state,
            detail: None,
            page: None,
            artifact: None,
            record: None,
        }
    }

    fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

/// Main run coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    extractor: StructuralExtractor,
    assembler: Assembler,
    pacer: HostPacer,
    normalizer: Normalizer,
    cancel: CancellationToken,
    /// Fetch outcome of every URL touched during discovery
    cache: HashMap<UrlKey, Result<FetchedDocument, FetchError>>,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration, already validated
    /// * `fetcher` - Fetcher used for discovery and for the page pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(BinderError)` - A configured selector does not parse
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, BinderError> {
        let extractor = StructuralExtractor::from_config(&config.extract)?;
        let assembler =
            Assembler::markdown(Duration::from_millis(config.output.render_timeout_ms));
        let pacer = HostPacer::new(Duration::from_millis(config.crawl.inter_request_delay_ms));
        let normalizer = Normalizer::new(config.crawl.excluded_extensions.iter());

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor,
            assembler,
            pacer,
            normalizer,
            cancel: CancellationToken::new(),
            cache: HashMap::new(),
        })
    }

    /// Uses `cancel` to stop the run early
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replaces the default Markdown assembler
    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Runs discovery (or reads the URL list), the page pipeline and assembly
    ///
    /// Per-page failures are counted in the summary. The run fails only for an
    /// invalid seed, an empty URL set, or when no page could be rendered.
    pub async fn run(mut self) -> Result<RunReport, BinderError> {
        let mut summary = RunSummary::new();

        let urls = self.resolve_urls(&mut summary).await?;
        summary.urls_discovered = urls.len();
        if urls.is_empty() {
            return Err(BinderError::NoUrls);
        }

        let host = urls.first().and_then(UrlKey::host);
        tracing::info!(
            "Processing {} pages with {} worker(s)",
            urls.len(),
            self.config.crawl.workers
        );

        let processed = self.process_pages(urls).await;
        if self.cancel.is_cancelled() {
            summary.cancelled = true;
            tracing::warn!("Run cancelled; assembling completed pages only");
        }

        let output = match self.config.extract.mode {
            ExtractionMode::Document => {
                let mut assembly = Assembly::new();
                for item in processed {
                    if let (Some(page), Some(artifact)) = (&item.page, item.artifact) {
                        assembly.push(page, artifact);
                    }
                    summary.record(item.url, item.state, item.detail);
                }
                let document = assembly.finish(&self.assembler).await?;
                summary.pages_assembled = document.page_count;
                RunOutput::Document(document)
            }
            ExtractionMode::Details => {
                let mut records = Vec::new();
                for item in processed {
                    if let Some(record) = item.record {
                        records.push(record);
                    }
                    summary.record(item.url, item.state, item.detail);
                }
                RunOutput::Records(records)
            }
        };

        summary.finish();
        Ok(RunReport {
            summary,
            output,
            host,
        })
    }

    /// Resolves the URLs to process from the list file or by discovery
    async fn resolve_urls(&mut self, summary: &mut RunSummary) -> Result<Vec<UrlKey>, BinderError> {
        let config = Arc::clone(&self.config);
        let crawl = &config.crawl;
        let filter = crawl.url_filter.as_deref();

        if let Some(path) = &crawl.urls_file {
            let urls = load_url_list(Path::new(path), &self.normalizer)?;
            tracing::info!("Loaded {} URLs from {}", urls.len(), path);
            return Ok(filter_and_truncate(urls, filter, crawl.max_urls));
        }

        let seed = crawl.seed_url.as_deref().ok_or(BinderError::NoUrls)?;
        self.discover(seed, summary).await
    }

    /// Breadth-first discovery from `seed`
    ///
    /// Strictly sequential: one fetch at a time with the politeness delay after
    /// each fetched entry.
    pub async fn discover(
        &mut self,
        seed: &str,
        summary: &mut RunSummary,
    ) -> Result<Vec<UrlKey>, BinderError> {
        let seed_key = self.normalizer.normalize_seed(seed).map_err(|e| BinderError::InvalidSeed {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;
        let origin_host = seed_key.host().ok_or_else(|| BinderError::InvalidSeed {
            url: seed.to_string(),
            reason: "missing host".to_string(),
        })?;

        let config = Arc::clone(&self.config);
        let delay = Duration::from_millis(config.crawl.inter_request_delay_ms);
        let timeout = Duration::from_millis(config.fetch.timeout_ms);

        tracing::info!(
            "Discovering pages from {} (max depth {}, max URLs {})",
            seed_key,
            config.crawl.max_depth,
            config.crawl.max_urls
        );

        let mut frontier = Frontier::new(config.crawl.max_depth, config.crawl.max_urls);
        frontier.seed(seed_key)?;

        while let Some(entry) = frontier.next_entry() {
            if self.cancel.is_cancelled() {
                break;
            }

            tracing::debug!(url = %entry.url, depth = entry.depth, "Fetching");
            let result = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = self.fetcher.fetch(&entry.url, timeout) => result,
            };
            summary.discovery_fetches += 1;

            match &result {
                Ok(document) => {
                    let base = match Url::parse(&document.final_url) {
                        Ok(base) => base,
                        Err(_) => entry.url.to_url()?,
                    };
                    let links = discover_links(&document.body, &base, &origin_host, &self.normalizer);
                    let mut added = 0;
                    for link in links {
                        if frontier.offer(link, entry.depth + 1) {
                            added += 1;
                        }
                    }
                    tracing::debug!(url = %entry.url, new_links = added, "Expanded");
                }
                Err(e) => {
                    summary.discovery_failures += 1;
                    tracing::warn!("Failed to fetch {}: {}", entry.url, e);
                }
            }
            self.cache.insert(entry.url, result);

            if !delay.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if self.cancel.is_cancelled() {
            frontier.abort()?;
            summary.cancelled = true;
        } else {
            frontier.finish()?;
        }
        summary.crawl_state = Some(frontier.state());

        tracing::info!(
            "Discovery {}: {} URLs visited, {} fetched",
            frontier.state(),
            frontier.visited_count(),
            summary.discovery_fetches
        );

        Ok(frontier.into_discovered(config.crawl.url_filter.as_deref(), config.crawl.max_urls))
    }

    /// Runs every page through fetch, extraction and rendering
    ///
    /// Up to `workers` pages are in flight; results come back in input order.
    async fn process_pages(&self, urls: Vec<UrlKey>) -> Vec<ProcessedPage> {
        let total = urls.len();
        let workers = self.config.crawl.workers.max(1);

        stream::iter(urls.into_iter().enumerate())
            .map(|(index, url)| self.process_page(index + 1, total, url))
            .buffered(workers)
            .collect::<Vec<_>>()
            .await
    }

    async fn process_page(&self, sequence: usize, total: usize, url: UrlKey) -> ProcessedPage {
        let document = match self.cache.get(&url) {
            Some(cached) => cached.clone(),
            None => {
                if self.cancel.is_cancelled() {
                    return ProcessedPage::new(url, PageState::Cancelled);
                }
                self.pacer.wait_turn(&url).await;
                let timeout = Duration::from_millis(self.config.fetch.timeout_ms);
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        return ProcessedPage::new(url, PageState::Cancelled);
                    }
                    result = self.fetcher.fetch(&url, timeout) => result,
                }
            }
        };

        tracing::info!("[{}/{}] {}", sequence, total, url);

        let document = match document {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                let mut processed = ProcessedPage::new(url, PageState::FetchFailed).with_detail(&e);
                if self.config.extract.mode == ExtractionMode::Details {
                    processed.record = Some(PageRecord::failed(&processed.url, &e));
                }
                return processed;
            }
        };

        match self.config.extract.mode {
            ExtractionMode::Details => {
                let details = extract_details(&document.body, &url);
                let mut processed = ProcessedPage::new(url, PageState::Summarized);
                processed.record = Some(PageRecord::from_details(details));
                processed
            }
            ExtractionMode::Document => self.render_document_page(sequence, url, &document).await,
        }
    }

    async fn render_document_page(
        &self,
        sequence: usize,
        url: UrlKey,
        document: &FetchedDocument,
    ) -> ProcessedPage {
        let page = extract_page(document, &self.extractor);
        tracing::debug!(url = %url, blocks = page.blocks.len(), title = %page.title, "Extracted");

        if self.config.output.keep_intermediate {
            if let Err(e) = write_intermediate(&self.config.output.directory, sequence, &page) {
                tracing::warn!("Failed to keep intermediate result for {}: {}", url, e);
            }
        }

        if page.is_empty() {
            tracing::warn!("No content extracted from {}", url);
            return ProcessedPage::new(url, PageState::Empty);
        }

        match self.assembler.render_page(&page).await {
            Ok(Some(artifact)) => {
                let mut processed = ProcessedPage::new(url, PageState::Rendered);
                processed.page = Some(page);
                processed.artifact = Some(artifact);
                processed
            }
            Ok(None) => ProcessedPage::new(url, PageState::Empty),
            Err(e) => {
                tracing::warn!("Failed to render {}: {}", url, e);
                ProcessedPage::new(url, PageState::RenderFailed).with_detail(e)
            }
        }
    }
}

/// Parses a URL list: one URL per line, blank lines and `#` comments ignored
///
/// Lines without a scheme get `https://`. Invalid or denied lines are skipped
/// with a warning and duplicates keep their first position.
pub fn parse_url_list(content: &str, normalizer: &Normalizer) -> Vec<UrlKey> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match normalizer.normalize_seed(line) {
            Ok(key) => {
                if seen.insert(key.clone()) {
                    urls.push(key);
                }
            }
            Err(e) => tracing::warn!("Skipping '{}' in URL list: {}", line, e),
        }
    }

    urls
}

/// Reads and parses a URL list file
pub fn load_url_list(path: &Path, normalizer: &Normalizer) -> Result<Vec<UrlKey>, BinderError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&content, normalizer))
}

/// Writes one extracted page as `{sequence:03}_{path}.json`
fn write_intermediate(directory: &str, sequence: usize, page: &PageResult) -> Result<PathBuf, BinderError> {
    let dir = Path::new(directory).join("intermediate");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{:03}_{}.json", sequence, sanitize_path(&page.url)));
    std::fs::write(&path, serde_json::to_string_pretty(page)?)?;
    Ok(path)
}

/// Runs a complete binder operation with the fetcher the config asks for
///
/// A browser session, when used, is closed before returning whether or not the
/// run succeeded.
///
/// # Example
///
/// ```no_run
/// use site_binder::config::load_config;
/// use site_binder::crawler::run_binder;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("binder.toml"))?;
/// let report = run_binder(config, CancellationToken::new()).await?;
/// println!("{} pages assembled", report.summary.pages_assembled);
/// # Ok(())
/// # }
/// ```
pub async fn run_binder(config: Config, cancel: CancellationToken) -> Result<RunReport, BinderError> {
    if !config.fetch.use_scripting_fetch {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
        return Coordinator::new(config, fetcher)?
            .with_cancellation(cancel)
            .run()
            .await;
    }

    let session = BrowserSession::launch().await?;
    let fetcher = Arc::new(BrowserFetcher::new(&session, &config.fetch, &config.extract));
    let result = match Coordinator::new(config, fetcher) {
        Ok(coordinator) => coordinator.with_cancellation(cancel).run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.close().await {
        tracing::warn!("{}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlConfig, ExtractConfig};
    use crate::url::normalize_seed;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory site: path -> links; every page has a heading and a paragraph
    struct StaticSite {
        pages: HashMap<String, Vec<String>>,
        failing: HashSet<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl StaticSite {
        fn new(pages: Vec<(&str, Vec<&str>)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(path, links)| {
                        (path.to_string(), links.into_iter().map(String::from).collect())
                    })
                    .collect(),
                failing: HashSet::new(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, path: &str) -> Self {
            self.failing.insert(path.to_string());
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticSite {
        async fn fetch(&self, url: &UrlKey, _timeout: Duration) -> Result<FetchedDocument, FetchError> {
            let path = url.path();
            self.fetched.lock().unwrap().push(path.clone());

            if self.failing.contains(&path) {
                return Err(FetchError::Status(500));
            }
            let links = self.pages.get(&path).ok_or(FetchError::Status(404))?;
            let anchors: String = links
                .iter()
                .map(|l| format!(r#"<a href="{}">link</a>"#, l))
                .collect();
            let body = format!(
                "<html><body><h1>Page {}</h1><p>This is the body text of page {}.</p>{}</body></html>",
                path, path, anchors
            );
            Ok(FetchedDocument {
                url: url.clone(),
                final_url: url.to_string(),
                body,
                scripted: None,
            })
        }
    }

    fn config(max_depth: u32, max_urls: usize) -> Config {
        Config {
            crawl: CrawlConfig {
                seed_url: Some("https://example.test/".to_string()),
                max_depth,
                max_urls,
                inter_request_delay_ms: 0,
                ..CrawlConfig::default()
            },
            ..Config::default()
        }
    }

    /// Binary tree of depth 3: / -> /1,/2 -> /11,/12,/21,/22 -> /111..
    fn binary_tree() -> StaticSite {
        StaticSite::new(vec![
            ("/", vec!["/1", "/2"]),
            ("/1", vec!["/11", "/12", "/2"]),
            ("/2", vec!["/21", "/22", "/1"]),
            ("/11", vec!["/111", "/112"]),
            ("/12", vec!["/121", "/122"]),
            ("/21", vec!["/211", "/212"]),
            ("/22", vec!["/221", "/222"]),
        ])
    }

    fn paths(keys: &[UrlKey]) -> Vec<String> {
        keys.iter().map(|k| k.path()).collect()
    }

    #[tokio::test]
    async fn test_depth_bound_and_single_fetch() {
        let site = Arc::new(binary_tree());
        let mut coordinator = Coordinator::new(config(2, 50), site.clone()).unwrap();
        let mut summary = RunSummary::new();

        let discovered = coordinator
            .discover("https://example.test/", &mut summary)
            .await
            .unwrap();

        // Depth 0 and 1 are expanded; depth 2 is visited but never fetched
        assert_eq!(site.fetched(), vec!["/", "/1", "/2"]);
        assert_eq!(
            paths(&discovered),
            vec!["/", "/1", "/2", "/11", "/12", "/21", "/22"]
        );
        assert_eq!(summary.crawl_state, Some(crate::crawler::CrawlState::Completed));
    }

    #[tokio::test]
    async fn test_bfs_level_order() {
        let site = Arc::new(binary_tree());
        let mut coordinator = Coordinator::new(config(3, 50), site.clone()).unwrap();
        let mut summary = RunSummary::new();

        coordinator
            .discover("https://example.test/", &mut summary)
            .await
            .unwrap();

        assert_eq!(
            site.fetched(),
            vec!["/", "/1", "/2", "/11", "/12", "/21", "/22"]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_abort() {
        let site = Arc::new(
            StaticSite::new(vec![
                ("/", vec!["/a", "/b"]),
                ("/a", vec![]),
                ("/b", vec!["/c"]),
                ("/c", vec![]),
            ])
            .failing("/a"),
        );
        let coordinator = Coordinator::new(config(3, 50), site.clone()).unwrap();
        let report = coordinator.run().await.unwrap();

        assert_eq!(report.summary.discovery_failures, 1);
        assert_eq!(report.summary.count(PageState::FetchFailed), 1);
        assert_eq!(report.summary.count(PageState::Rendered), 3);

        // The failed page is not fetched a second time by the pipeline
        let a_fetches = site.fetched().iter().filter(|p| *p == "/a").count();
        assert_eq!(a_fetches, 1);

        match report.output {
            RunOutput::Document(document) => {
                let titles: Vec<&str> = document.toc.iter().map(|e| e.title.as_str()).collect();
                assert_eq!(titles, vec!["Page /", "Page /b", "Page /c"]);
            }
            RunOutput::Records(_) => panic!("expected a document"),
        }
    }

    #[tokio::test]
    async fn test_pipeline_fetches_unexpanded_pages_once() {
        let site = Arc::new(binary_tree());
        let coordinator = Coordinator::new(config(1, 50), site.clone()).unwrap();
        let report = coordinator.run().await.unwrap();

        assert_eq!(report.summary.pages_assembled, 3);
        let mut fetched = site.fetched();
        fetched.sort();
        assert_eq!(fetched, vec!["/", "/1", "/2"]);
    }

    #[tokio::test]
    async fn test_workers_keep_processing_order() {
        let site = Arc::new(binary_tree());
        let mut cfg = config(2, 50);
        cfg.crawl.workers = 4;
        let report = Coordinator::new(cfg, site).unwrap().run().await.unwrap();

        let urls: Vec<String> = report.summary.outcomes.iter().map(|o| o.url.path()).collect();
        assert_eq!(urls, vec!["/", "/1", "/2", "/11", "/12", "/21", "/22"]);
        assert_eq!(report.host.as_deref(), Some("example.test"));
    }

    #[tokio::test]
    async fn test_filter_and_limit_after_traversal() {
        let site = Arc::new(binary_tree());
        let mut cfg = config(2, 2);
        cfg.crawl.url_filter = Some("/1".to_string());
        let mut coordinator = Coordinator::new(cfg, site.clone()).unwrap();
        let mut summary = RunSummary::new();

        let discovered = coordinator
            .discover("https://example.test/", &mut summary)
            .await
            .unwrap();

        // Soft cap of 4 stops traversal after expanding / and /1
        assert_eq!(paths(&discovered), vec!["/1", "/11"]);
    }

    #[tokio::test]
    async fn test_details_mode_produces_records() {
        let site = Arc::new(StaticSite::new(vec![("/", vec!["/a"]), ("/a", vec![])]).failing("/a"));
        let mut cfg = config(2, 10);
        cfg.extract = ExtractConfig {
            mode: ExtractionMode::Details,
            ..ExtractConfig::default()
        };
        let report = Coordinator::new(cfg, site).unwrap().run().await.unwrap();

        match report.output {
            RunOutput::Records(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].title.as_deref(), Some("Page /"));
                assert!(records[1].is_failed());
            }
            RunOutput::Document(_) => panic!("expected records"),
        }
        assert_eq!(report.summary.count(PageState::Summarized), 1);
    }

    #[tokio::test]
    async fn test_all_pages_failing_is_assembly_error() {
        let site = Arc::new(StaticSite::new(vec![]).failing("/"));
        let err = Coordinator::new(config(2, 10), site)
            .unwrap()
            .run()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BinderError::Assembly(crate::output::AssemblyError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_processes_nothing() {
        let site = Arc::new(binary_tree());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let coordinator = Coordinator::new(config(2, 10), site.clone())
            .unwrap()
            .with_cancellation(cancel);
        let err = coordinator.run().await.unwrap_err();

        // The seed is still the discovered set, but nothing was fetched
        assert!(matches!(err, BinderError::Assembly(_)));
        assert!(site.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_seed() {
        let site = Arc::new(binary_tree());
        let mut coordinator = Coordinator::new(config(2, 10), site).unwrap();
        let err = coordinator
            .discover("ftp://example.test/", &mut RunSummary::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BinderError::InvalidSeed { .. }));
    }

    #[test]
    fn test_parse_url_list() {
        let content = "# docs\nhttps://example.test/a\n\nexample.test/b\nhttps://example.test/a/\nnot a url\n";
        let urls = parse_url_list(content, &Normalizer::default());
        assert_eq!(
            urls.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
            vec!["https://example.test/a", "https://example.test/b"]
        );
    }

    #[test]
    fn test_url_list_honors_configured_extensions() {
        let content = "https://example.test/report.docx
https://example.test/guide
";
        let normalizer = Normalizer::new([".docx"]);
        let urls = parse_url_list(content, &normalizer);
        assert_eq!(paths(&urls), vec!["/guide"]);
    }

    #[tokio::test]
    async fn test_seed_with_configured_extension_is_invalid() {
        let site = Arc::new(binary_tree());
        let mut cfg = config(2, 10);
        cfg.crawl.excluded_extensions = vec![".html".to_string()];
        let mut coordinator = Coordinator::new(cfg, site).unwrap();

        let err = coordinator
            .discover("https://example.test/index.html", &mut RunSummary::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BinderError::InvalidSeed { .. }));

        // The default denylist does not include .html
        assert!(normalize_seed("https://example.test/index.html").is_ok());
    }

    #[tokio::test]
    async fn test_urls_file_mode_skips_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("urls.txt");
        std::fs::write(&list, "https://example.test/1\nhttps://example.test/2\n").unwrap();

        let site = Arc::new(binary_tree());
        let mut cfg = config(2, 10);
        cfg.crawl.seed_url = None;
        cfg.crawl.urls_file = Some(list.to_string_lossy().to_string());

        let report = Coordinator::new(cfg, site.clone()).unwrap().run().await.unwrap();
        assert!(report.summary.crawl_state.is_none());
        assert_eq!(site.fetched(), vec!["/1", "/2"]);
        assert_eq!(report.summary.pages_assembled, 2);
    }

    #[tokio::test]
    async fn test_keep_intermediate_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(StaticSite::new(vec![("/", vec![])]));
        let mut cfg = config(1, 10);
        cfg.output.keep_intermediate = true;
        cfg.output.directory = dir.path().to_string_lossy().to_string();

        Coordinator::new(cfg, site).unwrap().run().await.unwrap();

        let path = dir.path().join("intermediate").join("001_index.json");
        let page: PageResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(page.title, "Page /");
    }
}
