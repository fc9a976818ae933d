//! Output module for assembling documents and reporting runs
//!
//! This module handles:
//! - The renderer and merger contracts and their Markdown implementations
//! - Assembling rendered pages into one document with a table of contents
//! - Normalized JSON export records
//! - Run statistics

mod assembler;
mod markdown;
mod records;
pub mod stats;
mod traits;

pub use assembler::{toc_title, Assembler, Assembly, MAX_TOC_TITLE_CHARS};
pub use markdown::{
    format_page, format_toc, sanitize_path, MarkdownMerger, MarkdownRenderer, PAGE_SEPARATOR,
};
pub use records::{write_records, PageRecord, RecordExport};
pub use stats::{print_statistics, PageOutcome, RunSummary};
pub use traits::{
    AssemblyError, DocumentMerger, FinalDocument, MergeError, PageArtifact, PageRenderer,
    RenderError, TocEntry,
};

use std::path::{Path, PathBuf};

/// Writes the final document and, when asked, each page artifact
///
/// Parts go to a `parts/` directory next to the document.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written document
/// * `Err(std::io::Error)` - A file could not be written
pub fn write_document(
    document: &FinalDocument,
    path: &Path,
    keep_parts: bool,
) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, &document.bytes)?;

    if keep_parts {
        let parts_dir = path
            .parent()
            .map(|p| p.join("parts"))
            .unwrap_or_else(|| PathBuf::from("parts"));
        std::fs::create_dir_all(&parts_dir)?;
        for part in &document.parts {
            std::fs::write(parts_dir.join(format!("{}.md", part.name)), &part.bytes)?;
        }
        tracing::debug!("Kept {} parts in {}", document.parts.len(), parts_dir.display());
    }

    tracing::info!(
        "Wrote {} pages to {}",
        document.page_count,
        path.display()
    );
    Ok(path.to_path_buf())
}
