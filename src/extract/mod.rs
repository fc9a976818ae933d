//! Content extraction module for Site-Binder
//!
//! Turns a fetched page into a [`PageResult`]: a title plus an ordered list of
//! typed [`ContentBlock`]s. Statically fetched pages go through the
//! [`StructuralExtractor`]; pages rendered by a browser carry a [`ScriptedPage`]
//! payload that maps onto the same blocks.
//!
//! The `details` mode ([`extract_details`]) is a separate summary extractor and
//! never feeds the document assembler.

mod blocks;
mod details;
mod mode;
mod scripted;
mod structural;

pub use blocks::{ContentBlock, PageResult};
pub use details::{extract_details, PageDetails};
pub use mode::ExtractionMode;
pub use scripted::{build_extraction_script, ScriptedPage, ScriptedSection};
pub use structural::{StructuralExtractor, MAX_NESTING_DEPTH};

use crate::crawler::FetchedDocument;

/// Extracts a fetched page with the strategy matching how it was fetched
///
/// A scripted payload wins when it yields content; otherwise the rendered
/// HTML goes through structural extraction.
pub fn extract_page(document: &FetchedDocument, extractor: &StructuralExtractor) -> PageResult {
    if let Some(scripted) = &document.scripted {
        let result = scripted.clone().into_page_result(&document.url);
        if !result.is_empty() {
            return result;
        }
        tracing::debug!(url = %document.url, "Scripted payload empty, using structural extraction");
    }
    extractor.extract(&document.body, &document.url)
}
