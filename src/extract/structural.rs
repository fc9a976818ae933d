//! Structural extraction of content blocks from a parsed document
//!
//! The extractor picks a content root, marks boilerplate subtrees for removal,
//! and classifies the remaining elements in document order. Removal is tracked
//! by `NodeId`, so the parsed tree itself is never mutated.

use super::blocks::{
    truncate_chars, ContentBlock, PageResult, SeenText, MAX_CODE_CHARS, MIN_CODE_CHARS,
    MIN_PARAGRAPH_CHARS,
};
use crate::config::ExtractConfig;
use crate::url::UrlKey;
use crate::ConfigError;
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Maximum element nesting followed during classification
///
/// Deeper branches are skipped with a warning instead of risking the stack.
pub const MAX_NESTING_DEPTH: usize = 100;

const MIN_CONTAINER_CHARS: usize = 30;
const MIN_FALLBACK_LINE_CHARS: usize = 30;

/// Children that make a generic container a wrapper rather than a paragraph
const BLOCK_CHILDREN: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "pre",
    "blockquote",
];

/// Selector-driven extractor for statically fetched pages
#[derive(Debug, Clone)]
pub struct StructuralExtractor {
    content_selectors: Vec<Selector>,
    boilerplate_selectors: Vec<Selector>,
    title_separators: Vec<String>,
    min_root_text: usize,
}

impl StructuralExtractor {
    /// Compiles the selector tables of an extraction config
    ///
    /// # Arguments
    ///
    /// * `config` - Extraction settings with content and boilerplate selectors
    ///
    /// # Returns
    ///
    /// * `Ok(StructuralExtractor)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed to parse
    pub fn from_config(config: &ExtractConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content_selectors: compile(&config.content_selectors)?,
            boilerplate_selectors: compile(&config.boilerplate_selectors)?,
            title_separators: config.title_separators.clone(),
            min_root_text: config.min_root_text,
        })
    }

    /// Parses `html` and extracts its page result
    pub fn extract(&self, html: &str, url: &UrlKey) -> PageResult {
        let document = Html::parse_document(html);
        self.extract_document(&document, url)
    }

    /// Extracts title and blocks from an already parsed document
    ///
    /// Never fails: a page without usable content yields an empty title
    /// and no blocks.
    pub fn extract_document(&self, document: &Html, url: &UrlKey) -> PageResult {
        let title = self.resolve_title(document);
        let root = self.content_root(document);

        let removed = self.boilerplate_ids(root);
        let mut pass = ClassificationPass {
            removed: &removed,
            seen: SeenText::default(),
            blocks: Vec::new(),
        };
        pass.visit(*root, 0);

        let mut blocks = pass.blocks;
        if blocks.is_empty() {
            blocks = fallback_paragraphs(root, &removed);
        }

        tracing::debug!(url = %url, blocks = blocks.len(), "Extracted page");

        PageResult {
            url: url.clone(),
            title,
            blocks,
        }
    }

    /// First `h1` text, else the `<title>` cut at the first separator present
    fn resolve_title(&self, document: &Html) -> String {
        if let Some(h1) = select_first(document, "h1") {
            let text = joined_text(h1, &HashSet::new(), Joiner::Inline);
            if !text.is_empty() {
                return text;
            }
        }

        let Some(title) = select_first(document, "title") else {
            return String::new();
        };
        let text = collapse(&title.text().collect::<String>());

        for separator in &self.title_separators {
            if let Some(idx) = text.find(separator.as_str()) {
                return text[..idx].trim().to_string();
            }
        }
        text
    }

    /// First configured region holding enough text, else the body
    fn content_root<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        for selector in &self.content_selectors {
            if let Some(candidate) = document.select(selector).next() {
                if stripped_len(candidate) > self.min_root_text {
                    return candidate;
                }
            }
        }

        select_first(document, "body").unwrap_or_else(|| document.root_element())
    }

    fn boilerplate_ids(&self, root: ElementRef<'_>) -> HashSet<NodeId> {
        let mut removed = HashSet::new();
        for selector in &self.boilerplate_selectors {
            for element in root.select(selector) {
                removed.insert(element.id());
            }
        }
        // The root is the region we are extracting from
        removed.remove(&root.id());
        removed
    }
}

fn compile(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors
        .iter()
        .map(|raw| {
            Selector::parse(raw).map_err(|e| ConfigError::InvalidSelector {
                selector: raw.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

struct ClassificationPass<'r> {
    removed: &'r HashSet<NodeId>,
    seen: SeenText,
    blocks: Vec<ContentBlock>,
}

impl ClassificationPass<'_> {
    /// Classifies every non-removed element below `node` in document order
    fn visit(&mut self, node: NodeRef<'_, Node>, depth: usize) {
        if depth > MAX_NESTING_DEPTH {
            tracing::warn!(
                depth = depth,
                limit = MAX_NESTING_DEPTH,
                "Maximum nesting depth exceeded, skipping deeper content"
            );
            return;
        }

        for child in node.children() {
            let Some(element) = ElementRef::wrap(child) else {
                continue;
            };
            if self.removed.contains(&element.id()) {
                continue;
            }
            self.classify(element);
            self.visit(child, depth + 1);
        }
    }

    fn classify(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<u8>().unwrap_or(1);
                let text = self.inline_text(element);
                if !text.is_empty() && self.seen.claim(&text) {
                    self.blocks.push(ContentBlock::Heading { level, text });
                }
            }
            "p" => {
                let text = self.inline_text(element);
                if text.chars().count() > MIN_PARAGRAPH_CHARS && self.seen.claim(&text) {
                    self.blocks.push(ContentBlock::Paragraph { text });
                }
            }
            "ul" | "ol" => {
                let mut items = Vec::new();
                for item in element.children().filter_map(ElementRef::wrap) {
                    if item.value().name() != "li" || self.removed.contains(&item.id()) {
                        continue;
                    }
                    let text = self.inline_text(item);
                    if !text.is_empty() && self.seen.claim(&text) {
                        items.push(text);
                    }
                }
                if !items.is_empty() {
                    self.blocks.push(ContentBlock::List {
                        ordered: name == "ol",
                        items,
                    });
                }
            }
            "pre" => {
                let source = element
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|e| e.value().name() == "code" && !self.removed.contains(&e.id()))
                    .unwrap_or(element);
                let mut raw = String::new();
                push_text(*source, self.removed, Joiner::Verbatim, &mut raw, 0);
                let text = raw.trim();
                if text.chars().count() > MIN_CODE_CHARS && self.seen.claim(text) {
                    self.blocks.push(ContentBlock::Code {
                        text: truncate_chars(text, MAX_CODE_CHARS),
                    });
                }
            }
            "blockquote" => {
                let text = self.inline_text(element);
                if !text.is_empty() && self.seen.claim(&text) {
                    self.blocks.push(ContentBlock::Quote { text });
                }
            }
            "div" | "section" | "span" => {
                if has_block_children(element) {
                    return;
                }
                let text = direct_text(element);
                if text.chars().count() >= MIN_CONTAINER_CHARS && self.seen.claim(&text) {
                    self.blocks.push(ContentBlock::Paragraph { text });
                }
            }
            _ => {}
        }
    }

    fn inline_text(&self, element: ElementRef<'_>) -> String {
        joined_text(element, self.removed, Joiner::Inline)
    }
}

/// How the text nodes below an element are put together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joiner {
    /// Text nodes separated by single spaces
    Inline,
    /// Every element boundary and `<br>` starts a new line
    Lines,
    /// Text kept as written, `<br>` as a newline
    Verbatim,
}

/// Text of `element` put together by `joiner`, whitespace collapsed
fn joined_text(element: ElementRef<'_>, removed: &HashSet<NodeId>, joiner: Joiner) -> String {
    let mut raw = String::new();
    push_text(*element, removed, joiner, &mut raw, 0);
    collapse(&raw)
}

/// Appends the text below `node`, skipping removed subtrees
fn push_text(
    node: NodeRef<'_, Node>,
    removed: &HashSet<NodeId>,
    joiner: Joiner,
    out: &mut String,
    depth: usize,
) {
    if depth > MAX_NESTING_DEPTH {
        return;
    }
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                if joiner == Joiner::Inline {
                    out.push(' ');
                }
                out.push_str(text);
            }
            Node::Element(element) if !removed.contains(&child.id()) => {
                if element.name() == "br" {
                    out.push(if joiner == Joiner::Inline { ' ' } else { '\n' });
                    continue;
                }
                if joiner == Joiner::Lines {
                    out.push('\n');
                }
                push_text(child, removed, joiner, out, depth + 1);
                if joiner == Joiner::Lines {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Text nodes that are immediate children of `element`
fn direct_text(element: ElementRef<'_>) -> String {
    let pieces: Vec<String> = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(collapse(text)),
            _ => None,
        })
        .filter(|piece| !piece.is_empty())
        .collect();
    pieces.join(" ")
}

fn has_block_children(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| BLOCK_CHILDREN.contains(&child.value().name()))
}

/// One paragraph per sufficiently long line of the root's text
fn fallback_paragraphs(root: ElementRef<'_>, removed: &HashSet<NodeId>) -> Vec<ContentBlock> {
    let mut raw = String::new();
    push_text(*root, removed, Joiner::Lines, &mut raw, 0);

    raw.lines()
        .map(collapse)
        .filter(|line| line.chars().count() > MIN_FALLBACK_LINE_CHARS)
        .map(|text| ContentBlock::Paragraph { text })
        .collect()
}

/// First element of `document` matching a literal selector
pub(crate) fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Characters of text once every text node is trimmed
fn stripped_len(element: ElementRef<'_>) -> usize {
    element.text().map(|t| t.trim().chars().count()).sum()
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub(crate) fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
