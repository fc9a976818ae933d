//! Script-executing fetcher backed by a headless browser
//!
//! The browser is an explicitly owned [`BrowserSession`]: the runner launches
//! it, hands it to [`BrowserFetcher::new`], and closes it when the run ends.
//! Dropping a session without closing it still stops its event handler task.
//!
//! Without the `browser` feature both types exist but launching fails.

use super::fetcher::{FetchError, FetchedDocument, Fetcher};
use crate::config::{ExtractConfig, FetchConfig};
use crate::url::UrlKey;
use crate::BinderError;
use async_trait::async_trait;
use std::time::Duration;

#[cfg(feature = "browser")]
use crate::extract::{build_extraction_script, ScriptedPage};
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use std::sync::Arc;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

/// A running headless browser
#[cfg(feature = "browser")]
pub struct BrowserSession {
    browser: Arc<Mutex<Browser>>,
    handler: JoinHandle<()>,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Launches a headless browser
    pub async fn launch() -> Result<Self, BinderError> {
        tracing::info!("Launching headless browser");

        let config = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .build()
            .map_err(|e| BinderError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BinderError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler,
        })
    }

    /// Closes the browser process
    pub async fn close(self) -> Result<(), BinderError> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| BinderError::Browser(format!("Failed to close browser: {}", e)))?;
        if let Err(e) = browser.wait().await {
            tracing::warn!("Browser did not exit cleanly: {}", e);
        }
        tracing::info!("Browser closed");
        Ok(())
    }
}

#[cfg(feature = "browser")]
impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Fetcher that renders each page in the browser before reading it
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    browser: Arc<Mutex<Browser>>,
    render_wait: Duration,
    script: String,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Creates a fetcher sharing `session`'s browser
    pub fn new(session: &BrowserSession, fetch: &FetchConfig, extract: &ExtractConfig) -> Self {
        Self {
            browser: Arc::clone(&session.browser),
            render_wait: Duration::from_millis(fetch.script_render_wait_ms),
            script: build_extraction_script(extract),
        }
    }

    async fn render(&self, url: &UrlKey) -> Result<FetchedDocument, FetchError> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?
        };

        tracing::debug!("Navigating to {}", url);
        let outcome = self.read_page(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }
        outcome
    }

    async fn read_page(
        &self,
        page: &chromiumoxide::Page,
        url: &UrlKey,
    ) -> Result<FetchedDocument, FetchError> {
        page.goto(url.as_str())
            .await
            .map_err(|e| FetchError::Browser(format!("Navigation failed: {}", e)))?;

        // Give client-side rendering time to settle
        tokio::time::sleep(self.render_wait).await;

        let scripted = match page.evaluate(self.script.clone()).await {
            Ok(result) => match result.into_value::<ScriptedPage>() {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!("Unexpected extraction payload from {}: {}", url, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Extraction script failed on {}: {}", url, e);
                None
            }
        };

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        let body = page
            .content()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedDocument {
            url: url.clone(),
            final_url,
            body,
            scripted,
        })
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &UrlKey, timeout: Duration) -> Result<FetchedDocument, FetchError> {
        // Navigation plus the render wait must fit in the timeout
        match tokio::time::timeout(timeout + self.render_wait, self.render(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout + self.render_wait)),
        }
    }
}

#[cfg(not(feature = "browser"))]
const NOT_COMPILED: &str =
    "Browser support not compiled. Rebuild with: cargo build --features browser";

// Stubs for when the browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession {
    _private: (),
}

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn launch() -> Result<Self, BinderError> {
        Err(BinderError::Browser(NOT_COMPILED.to_string()))
    }

    pub async fn close(self) -> Result<(), BinderError> {
        Ok(())
    }
}

#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    _private: (),
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(_session: &BrowserSession, _fetch: &FetchConfig, _extract: &ExtractConfig) -> Self {
        Self { _private: () }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, _url: &UrlKey, _timeout: Duration) -> Result<FetchedDocument, FetchError> {
        Err(FetchError::Browser(NOT_COMPILED.to_string()))
    }
}
