//! Document assembly: ordered page artifacts plus a generated TOC
//!
//! Pages are pushed in processing order. Only pages that rendered get an
//! ordinal, so the TOC never points at a page that is missing from the output.

use crate::extract::PageResult;
use crate::output::markdown::{MarkdownMerger, MarkdownRenderer};
use crate::output::traits::{
    AssemblyError, DocumentMerger, FinalDocument, PageArtifact, PageRenderer, RenderError,
    TocEntry,
};
use std::sync::Arc;
use std::time::Duration;

/// TOC titles longer than this are shortened
pub const MAX_TOC_TITLE_CHARS: usize = 70;

/// Renders pages and merges them into a [`FinalDocument`]
#[derive(Clone)]
pub struct Assembler {
    renderer: Arc<dyn PageRenderer>,
    merger: Arc<dyn DocumentMerger>,
    render_timeout: Duration,
}

impl Assembler {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        merger: Arc<dyn DocumentMerger>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            merger,
            render_timeout,
        }
    }

    /// Assembler producing one Markdown document
    pub fn markdown(render_timeout: Duration) -> Self {
        Self::new(
            Arc::new(MarkdownRenderer::default()),
            Arc::new(MarkdownMerger),
            render_timeout,
        )
    }

    /// Renders one page, bounded by the render timeout
    ///
    /// # Returns
    ///
    /// * `Ok(Some(artifact))` - The page rendered
    /// * `Ok(None)` - The page had no blocks; the renderer was not called
    /// * `Err(RenderError)` - The renderer failed or timed out
    pub async fn render_page(&self, page: &PageResult) -> Result<Option<PageArtifact>, RenderError> {
        if page.is_empty() {
            return Ok(None);
        }

        let render = self
            .renderer
            .render(page.display_title(), &page.url, &page.blocks);

        match tokio::time::timeout(self.render_timeout, render).await {
            Ok(result) => result.map(Some),
            Err(_) => Err(RenderError::Timeout(self.render_timeout)),
        }
    }

    /// Renders and merges `pages` in the given order
    ///
    /// Empty pages and render failures are skipped with a log line. Fails only
    /// when no page rendered or the merge itself fails.
    pub async fn assemble(&self, pages: &[PageResult]) -> Result<FinalDocument, AssemblyError> {
        let mut assembly = Assembly::new();

        for page in pages {
            match self.render_page(page).await {
                Ok(Some(artifact)) => {
                    assembly.push(page, artifact);
                }
                Ok(None) => {
                    tracing::debug!("Skipping {}: no content", page.url);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", page.url, e);
                }
            }
        }

        assembly.finish(self).await
    }
}

/// Ordered buffer of rendered pages awaiting the merge
#[derive(Debug, Default)]
pub struct Assembly {
    entries: Vec<TocEntry>,
    artifacts: Vec<PageArtifact>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rendered page and returns its ordinal
    ///
    /// The artifact is renamed to `{ordinal:03}_{name}`.
    pub fn push(&mut self, page: &PageResult, mut artifact: PageArtifact) -> usize {
        let ordinal = self.artifacts.len() + 1;
        artifact.name = format!("{:03}_{}", ordinal, artifact.name);

        self.entries.push(TocEntry {
            title: toc_title(page.display_title()),
            ordinal,
            source_url: page.url.clone(),
        });
        self.artifacts.push(artifact);
        ordinal
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Renders the TOC and merges it with every pushed artifact
    pub async fn finish(self, assembler: &Assembler) -> Result<FinalDocument, AssemblyError> {
        if self.is_empty() {
            return Err(AssemblyError::Empty);
        }

        let toc_render = assembler.renderer.render_toc(&self.entries);
        let toc = match tokio::time::timeout(assembler.render_timeout, toc_render).await {
            Ok(Ok(toc)) => toc,
            Ok(Err(e)) => return Err(AssemblyError::Toc(e)),
            Err(_) => {
                return Err(AssemblyError::Toc(RenderError::Timeout(
                    assembler.render_timeout,
                )))
            }
        };

        let bytes = assembler.merger.combine(&toc, &self.artifacts)?;
        tracing::info!("Assembled {} pages", self.artifacts.len());

        Ok(FinalDocument {
            bytes,
            page_count: self.artifacts.len(),
            toc: self.entries,
            parts: self.artifacts,
        })
    }
}

/// Shortens long titles to 67 characters plus `...`
pub fn toc_title(title: &str) -> String {
    if title.chars().count() > MAX_TOC_TITLE_CHARS {
        let cut: String = title.chars().take(MAX_TOC_TITLE_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}
