//! Renderer and merger traits and the artifact types they exchange
//!
//! A renderer turns one page's blocks into an opaque artifact; a merger joins
//! a table-of-contents artifact and the page artifacts into final bytes.

use crate::extract::ContentBlock;
use crate::url::UrlKey;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure to render one page; that page is left out
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("Render failed: {0}")]
    Failed(String),
}

/// Failure to join artifacts into the final document
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Merge failed: {0}")]
    Failed(String),
}

/// Errors that end assembly without a document
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("No pages were rendered; nothing to assemble")]
    Empty,

    #[error("Failed to render table of contents: {0}")]
    Toc(RenderError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Opaque output of a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArtifact {
    /// File stem used when the artifact is written on its own
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One line of the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    /// 1-based position among successfully rendered pages
    pub ordinal: usize,
    pub source_url: UrlKey,
}

/// The assembled document
///
/// TOC entry *i* refers to the *i*-th artifact in `parts`, which is also the
/// *i*-th content artifact after the TOC in `bytes`.
#[derive(Debug, Clone)]
pub struct FinalDocument {
    pub bytes: Vec<u8>,
    pub toc: Vec<TocEntry>,
    pub page_count: usize,
    pub parts: Vec<PageArtifact>,
}

/// Turns page content into artifacts
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders one page
    ///
    /// # Arguments
    ///
    /// * `title` - Page title, already falling back to the URL when missing
    /// * `source_url` - Where the page came from
    /// * `blocks` - The page's content blocks in order
    async fn render(
        &self,
        title: &str,
        source_url: &UrlKey,
        blocks: &[ContentBlock],
    ) -> Result<PageArtifact, RenderError>;

    /// Renders the table of contents
    async fn render_toc(&self, entries: &[TocEntry]) -> Result<PageArtifact, RenderError>;
}

/// Joins the TOC artifact and page artifacts, in that order
pub trait DocumentMerger: Send + Sync {
    fn combine(&self, toc: &PageArtifact, pages: &[PageArtifact]) -> Result<Vec<u8>, MergeError>;
}
