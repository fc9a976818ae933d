//! Markdown renderer and merger
//!
//! Each page becomes a Markdown section headed by its title and source URL;
//! the merged document is the TOC followed by the pages, separated by rules.

use crate::extract::ContentBlock;
use crate::output::traits::{
    DocumentMerger, MergeError, PageArtifact, PageRenderer, RenderError, TocEntry,
};
use crate::url::UrlKey;
use async_trait::async_trait;

/// Separator placed between artifacts in the merged document
pub const PAGE_SEPARATOR: &str = "\n---\n\n";

/// Renders pages and the TOC as Markdown
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    document_title: String,
}

impl MarkdownRenderer {
    pub fn new(document_title: impl Into<String>) -> Self {
        Self {
            document_title: document_title.into(),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new("Table of Contents")
    }
}

#[async_trait]
impl PageRenderer for MarkdownRenderer {
    async fn render(
        &self,
        title: &str,
        source_url: &UrlKey,
        blocks: &[ContentBlock],
    ) -> Result<PageArtifact, RenderError> {
        Ok(PageArtifact {
            name: sanitize_path(source_url),
            bytes: format_page(title, source_url, blocks).into_bytes(),
        })
    }

    async fn render_toc(&self, entries: &[TocEntry]) -> Result<PageArtifact, RenderError> {
        Ok(PageArtifact {
            name: "000_toc".to_string(),
            bytes: format_toc(&self.document_title, entries).into_bytes(),
        })
    }
}

/// Formats one page as Markdown
///
/// Block headings are shifted one level down so the page title stays the
/// only top-level heading. A leading heading repeating the title is dropped.
pub fn format_page(title: &str, source_url: &UrlKey, blocks: &[ContentBlock]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str(&format!("*Source: <{}>*\n\n", source_url));

    let body = match blocks.first() {
        Some(ContentBlock::Heading { text, .. }) if text == title => &blocks[1..],
        _ => blocks,
    };

    for block in body {
        match block {
            ContentBlock::Heading { level, text } => {
                let hashes = "#".repeat(usize::from((*level).clamp(1, 5)) + 1);
                md.push_str(&format!("{} {}\n\n", hashes, text));
            }
            ContentBlock::Paragraph { text } => {
                md.push_str(text);
                md.push_str("\n\n");
            }
            ContentBlock::List { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    if *ordered {
                        md.push_str(&format!("{}. {}\n", i + 1, item));
                    } else {
                        md.push_str(&format!("- {}\n", item));
                    }
                }
                md.push('\n');
            }
            ContentBlock::Code { text } => {
                md.push_str("```\n");
                md.push_str(text);
                md.push_str("\n```\n\n");
            }
            ContentBlock::Quote { text } => {
                for line in text.lines() {
                    md.push_str(&format!("> {}\n", line));
                }
                md.push('\n');
            }
        }
    }

    md
}

/// Formats the table of contents as a numbered list
pub fn format_toc(document_title: &str, entries: &[TocEntry]) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", document_title));
    for entry in entries {
        md.push_str(&format!("{}. {}\n", entry.ordinal, entry.title));
    }
    md
}

/// File stem for a page: its path with every non-word character replaced
///
/// Limited to 50 characters; the site root becomes `index`.
pub fn sanitize_path(url: &UrlKey) -> String {
    let path = url.path();
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return "index".to_string();
    }

    trimmed
        .chars()
        .take(50)
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Concatenates Markdown artifacts with horizontal rules
#[derive(Debug, Clone, Default)]
pub struct MarkdownMerger;

impl DocumentMerger for MarkdownMerger {
    fn combine(&self, toc: &PageArtifact, pages: &[PageArtifact]) -> Result<Vec<u8>, MergeError> {
        let mut bytes = toc.bytes.clone();
        for page in pages {
            bytes.extend_from_slice(PAGE_SEPARATOR.as_bytes());
            bytes.extend_from_slice(&page.bytes);
        }
        Ok(bytes)
    }
}
