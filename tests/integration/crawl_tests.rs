//! Integration tests for the binder
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full discover, extract and assemble cycle end-to-end.

use async_trait::async_trait;
use site_binder::config::{Config, CrawlConfig};
use site_binder::crawler::{run_binder, Coordinator, CrawlState, HttpFetcher, RunOutput};
use site_binder::extract::ContentBlock;
use site_binder::output::{
    write_document, Assembler, MarkdownMerger, MarkdownRenderer, PageArtifact, PageRenderer,
    RenderError, TocEntry,
};
use site_binder::state::PageState;
use site_binder::url::UrlKey;
use site_binder::FinalDocument;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at the mock server's root
fn create_test_config(base_url: &str, max_depth: u32, max_urls: usize) -> Config {
    Config {
        crawl: CrawlConfig {
            seed_url: Some(format!("{}/", base_url)),
            max_depth,
            max_urls,
            inter_request_delay_ms: 0,
            ..CrawlConfig::default()
        },
        ..Config::default()
    }
}

/// A page with a heading, a paragraph and links to `links`
fn page_html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<li><a href="{}">{}</a></li>"#, l, l))
        .collect();
    format!(
        r#"<html><head><title>{title} | Test Site</title></head><body>
        <nav><ul>{anchors}</ul></nav>
        <main><h1>{title}</h1><p>This page is called {title} and has some text.</p></main>
        </body></html>"#,
        title = title,
        anchors = anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str], times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_html(title, links))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn document(output: RunOutput) -> FinalDocument {
    match output {
        RunOutput::Document(document) => document,
        RunOutput::Records(_) => panic!("expected a document"),
    }
}

fn toc_titles(document: &FinalDocument) -> Vec<String> {
    document.toc.iter().map(|e| e.title.clone()).collect()
}

#[tokio::test]
async fn test_three_page_site_each_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Home", &["/a", "/b"], 1).await;
    mount_page(&mock_server, "/a", "Page A", &["/", "/b"], 1).await;
    mount_page(&mock_server, "/b", "Page B", &["/", "/a"], 1).await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let report = run_binder(config, CancellationToken::new())
        .await
        .expect("Run failed");

    assert_eq!(report.summary.urls_discovered, 3);
    assert_eq!(report.summary.crawl_state, Some(CrawlState::Completed));
    assert_eq!(report.summary.count(PageState::Rendered), 3);

    let document = document(report.output);
    assert_eq!(toc_titles(&document), vec!["Home", "Page A", "Page B"]);
    assert_eq!(document.page_count, 3);
}

#[tokio::test]
async fn test_depth_bound_on_binary_tree() {
    let mock_server = MockServer::start().await;

    // Depth 0..=2 are fetched exactly once; depth 3 never
    mount_page(&mock_server, "/", "Root", &["/l", "/r"], 1).await;
    mount_page(&mock_server, "/l", "L", &["/ll", "/lr", "/r"], 1).await;
    mount_page(&mock_server, "/r", "R", &["/rl", "/rr", "/l"], 1).await;
    for (route, children) in [
        ("/ll", ["/lll", "/llr"]),
        ("/lr", ["/lrl", "/lrr"]),
        ("/rl", ["/rll", "/rlr"]),
        ("/rr", ["/rrl", "/rrr"]),
    ] {
        let title = route.trim_start_matches('/').to_uppercase();
        mount_page(&mock_server, route, &title, &children, 1).await;
    }
    for route in ["/lll", "/llr", "/lrl", "/lrr", "/rll", "/rlr", "/rrl", "/rrr"] {
        mount_page(&mock_server, route, "Too deep", &[], 0).await;
    }

    let config = create_test_config(&mock_server.uri(), 2, 50);
    let report = run_binder(config, CancellationToken::new())
        .await
        .expect("Run failed");

    // Breadth-first processing order
    let document = document(report.output);
    assert_eq!(
        toc_titles(&document),
        vec!["Root", "L", "R", "LL", "LR", "RL", "RR"]
    );
}

#[tokio::test]
async fn test_fetch_failure_does_not_abort_run() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Home", &["/broken", "/ok"], 1).await;
    mount_page(&mock_server, "/ok", "Fine", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2, 10);
    let report = run_binder(config, CancellationToken::new())
        .await
        .expect("Run failed");

    assert_eq!(report.summary.discovery_failures, 1);
    assert_eq!(report.summary.count(PageState::FetchFailed), 1);

    let document = document(report.output);
    assert_eq!(toc_titles(&document), vec!["Home", "Fine"]);
    assert_eq!(document.toc[1].ordinal, 2);
}

#[tokio::test]
async fn test_cancellation_yields_partial_document() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "Home", &["/slow", "/a"], 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_html("Slow", &[]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/a", "Never", &[], 0).await;

    let mut config = create_test_config(&mock_server.uri(), 2, 10);
    config.fetch.timeout_ms = 30_000;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let report = run_binder(config, cancel).await.expect("Run failed");

    assert!(report.summary.cancelled);
    assert_eq!(report.summary.crawl_state, Some(CrawlState::Aborted));
    assert_eq!(report.summary.count(PageState::Cancelled), 2);

    let document = document(report.output);
    assert_eq!(toc_titles(&document), vec!["Home"]);
}

/// Markdown renderer that refuses one title
struct RefusingRenderer {
    inner: MarkdownRenderer,
    refuse: &'static str,
}

#[async_trait]
impl PageRenderer for RefusingRenderer {
    async fn render(
        &self,
        title: &str,
        source_url: &UrlKey,
        blocks: &[ContentBlock],
    ) -> Result<PageArtifact, RenderError> {
        if title == self.refuse {
            return Err(RenderError::Failed("refused".to_string()));
        }
        self.inner.render(title, source_url, blocks).await
    }

    async fn render_toc(&self, entries: &[TocEntry]) -> Result<PageArtifact, RenderError> {
        self.inner.render_toc(entries).await
    }
}

#[tokio::test]
async fn test_render_failure_keeps_ordinals_dense() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", "One", &["/2", "/3", "/4", "/5"], 1).await;
    mount_page(&mock_server, "/2", "Two", &[], 1).await;
    mount_page(&mock_server, "/3", "Three", &[], 1).await;
    mount_page(&mock_server, "/4", "Four", &[], 1).await;
    mount_page(&mock_server, "/5", "Five", &[], 1).await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch).expect("Failed to build client"));
    let assembler = Assembler::new(
        Arc::new(RefusingRenderer {
            inner: MarkdownRenderer::default(),
            refuse: "Three",
        }),
        Arc::new(MarkdownMerger),
        Duration::from_secs(5),
    );

    let report = Coordinator::new(config, fetcher)
        .expect("Failed to create coordinator")
        .with_assembler(assembler)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.summary.count(PageState::RenderFailed), 1);

    let document = document(report.output);
    let entries: Vec<(usize, String)> = document
        .toc
        .iter()
        .map(|e| (e.ordinal, e.title.clone()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (1, "One".to_string()),
            (2, "Two".to_string()),
            (3, "Four".to_string()),
            (4, "Five".to_string()),
        ]
    );

    let text = String::from_utf8(document.bytes).unwrap();
    assert!(!text.contains("# Three"));
}

#[tokio::test]
async fn test_url_list_and_written_output() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/docs/start", "Start", &["/docs/other"], 1).await;
    mount_page(&mock_server, "/docs/other", "Other", &[], 0).await;
    mount_page(&mock_server, "/blog", "Blog", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("urls.txt");
    std::fs::write(
        &list,
        format!("# pages\n{base}/docs/start\n{base}/blog\n", base = base_url),
    )
    .unwrap();

    let mut config = create_test_config(&base_url, 2, 10);
    config.crawl.seed_url = None;
    config.crawl.urls_file = Some(list.to_string_lossy().to_string());
    config.crawl.url_filter = Some("/docs/".to_string());

    let report = run_binder(config, CancellationToken::new())
        .await
        .expect("Run failed");
    assert!(report.summary.crawl_state.is_none());

    let out = dir.path().join("out").join("site.md");
    write_document(&document(report.output), &out, true).expect("Failed to write");

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("# Table of Contents\n\n1. Start\n"));
    assert!(text.contains("This page is called Start"));
    assert!(dir.path().join("out").join("parts").join("001_docs_start.md").exists());
}

#[tokio::test]
async fn test_fetcher_follows_redirects_and_rejects_errors() {
    use site_binder::config::FetchConfig;
    use site_binder::crawler::{FetchError, Fetcher};
    use site_binder::url::normalize_seed;

    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let location = format!("{}/new", base_url);

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", location.as_str()))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", "New", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hang"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).expect("Failed to build client");
    let timeout = Duration::from_secs(5);

    let old = normalize_seed(&format!("{}/old", base_url)).unwrap();
    let document = fetcher.fetch(&old, timeout).await.expect("Redirect not followed");
    assert_eq!(document.url, old);
    assert!(document.final_url.ends_with("/new"));
    assert!(document.body.contains("<h1>New</h1>"));

    let missing = normalize_seed(&format!("{}/missing", base_url)).unwrap();
    let err = fetcher.fetch(&missing, timeout).await.unwrap_err();
    assert_eq!(err, FetchError::Status(404));

    let hang = normalize_seed(&format!("{}/hang", base_url)).unwrap();
    let err = fetcher
        .fetch(&hang, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)));
}
