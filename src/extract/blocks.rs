//! Content model shared by both extraction strategies

use crate::url::UrlKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Paragraphs must be longer than this many characters
pub(crate) const MIN_PARAGRAPH_CHARS: usize = 15;
/// Code blocks must be longer than this many characters
pub(crate) const MIN_CODE_CHARS: usize = 5;
/// Code blocks are cut to this many characters
pub(crate) const MAX_CODE_CHARS: usize = 1000;

/// One classified unit of page content, in page order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    List { ordered: bool, items: Vec<String> },
    Code { text: String },
    Quote { text: String },
}

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: UrlKey,
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

impl PageResult {
    pub fn empty(url: UrlKey) -> Self {
        Self {
            url,
            title: String::new(),
            blocks: Vec::new(),
        }
    }

    /// A page without blocks has nothing to render
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The title, or the URL when no title was found
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.url.as_str()
        } else {
            &self.title
        }
    }
}

/// Page-wide record of emitted text
///
/// Once a text value has been emitted in any block it is never emitted again,
/// which keeps nested containers from repeating their children.
#[derive(Debug, Default)]
pub(crate) struct SeenText {
    seen: HashSet<String>,
}

impl SeenText {
    /// Records `text` and returns true if it had not been emitted before
    pub(crate) fn claim(&mut self, text: &str) -> bool {
        if self.seen.contains(text) {
            return false;
        }
        self.seen.insert(text.to_string());
        true
    }
}

/// Truncates to at most `max` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
