//! Per-page summary extraction for the `details` mode

use super::blocks::{truncate_chars, SeenText};
use super::structural::{collapse, select_first};
use crate::url::UrlKey;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 500;
const MAX_PREVIEW_CHARS: usize = 500;
const PREVIEW_PARAGRAPHS: usize = 5;
const MIN_KEY_POINT_CHARS: usize = 10;
const MAX_KEY_POINT_CHARS: usize = 150;
const ITEMS_PER_LIST: usize = 10;
const MAX_KEY_POINTS: usize = 5;
const MAX_TAG_CHARS: usize = 50;
const MAX_TAGS: usize = 5;

/// Regions searched for preview paragraphs, in priority order
const PREVIEW_ROOTS: &[&str] = &[
    "article",
    "main",
    ".content",
    ".post-content",
    ".video-content",
    ".entry-content",
    "body",
];

const TAG_CONTAINERS: &str = r#".tags, .categories, [class*="tag"], [class*="category"]"#;

/// A line starting with `12. ` followed by 15 to 150 characters
static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*\d+\.\s+([^\n]{15,150})").expect("numbered line pattern is valid")
});

/// Summary of one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetails {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub content_preview: Option<String>,
    pub key_points: Vec<String>,
    pub tags: Vec<String>,
}

/// Extracts a [`PageDetails`] summary from raw HTML
pub fn extract_details(html: &str, url: &UrlKey) -> PageDetails {
    let document = Html::parse_document(html);

    let title = select_first(&document, "h1")
        .or_else(|| select_first(&document, "title"))
        .map(|e| truncate_chars(&text_of(&e), MAX_TITLE_CHARS))
        .unwrap_or_default();

    PageDetails {
        url: url.to_string(),
        title,
        description: description(&document),
        content_preview: content_preview(&document),
        key_points: key_points(&document),
        tags: tags(&document),
    }
}

fn text_of(element: &ElementRef<'_>) -> String {
    collapse(&element.text().collect::<String>())
}

/// `meta[name=description]`, else `meta[property=og:description]`
fn description(document: &Html) -> Option<String> {
    let meta_content = |selector: &str| {
        select_first(document, selector)
            .and_then(|e| e.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| truncate_chars(c, MAX_DESCRIPTION_CHARS))
    };

    meta_content(r#"meta[name="description"]"#)
        .or_else(|| meta_content(r#"meta[property="og:description"]"#))
}

/// The first paragraphs of the main region, joined
fn content_preview(document: &Html) -> Option<String> {
    let root = PREVIEW_ROOTS
        .iter()
        .find_map(|selector| select_first(document, selector))?;
    let paragraph = Selector::parse("p").ok()?;

    let paragraphs: Vec<String> = root
        .select(&paragraph)
        .take(PREVIEW_PARAGRAPHS)
        .map(|p| text_of(&p))
        .filter(|t| !t.is_empty())
        .collect();

    let preview = truncate_chars(&paragraphs.join(" "), MAX_PREVIEW_CHARS);
    (!preview.is_empty()).then_some(preview)
}

/// Ordered-list items and numbered lines, deduplicated
fn key_points(document: &Html) -> Vec<String> {
    let mut candidates = Vec::new();

    if let (Ok(ol), Ok(li)) = (Selector::parse("ol"), Selector::parse("li")) {
        for list in document.select(&ol) {
            for item in list.select(&li).take(ITEMS_PER_LIST) {
                let text = text_of(&item);
                if text.chars().count() > MIN_KEY_POINT_CHARS {
                    candidates.push(truncate_chars(&text, MAX_KEY_POINT_CHARS));
                }
            }
        }
    }

    let full_text: String = document.root_element().text().collect();
    candidates.extend(numbered_lines(&full_text).take(ITEMS_PER_LIST));

    let mut seen = SeenText::default();
    candidates
        .into_iter()
        .filter(|c| seen.claim(c))
        .take(MAX_KEY_POINTS)
        .collect()
}

/// Bodies of lines shaped like `12. Some step`
fn numbered_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    NUMBERED_LINE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|body| body.as_str().trim_end().to_string())
}

/// Link and span texts inside tag or category containers
fn tags(document: &Html) -> Vec<String> {
    let (Ok(containers), Ok(labels)) = (Selector::parse(TAG_CONTAINERS), Selector::parse("a, span"))
    else {
        return Vec::new();
    };

    let mut seen = SeenText::default();
    let mut tags = Vec::new();

    for container in document.select(&containers) {
        for label in container.select(&labels) {
            let text = text_of(&label);
            if !text.is_empty() && text.chars().count() < MAX_TAG_CHARS && seen.claim(&text) {
                tags.push(text);
                if tags.len() == MAX_TAGS {
                    return tags;
                }
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_seed;

    fn run(html: &str) -> PageDetails {
        let url = normalize_seed("https://example.test/video/1").unwrap();
        extract_details(html, &url)
    }

    #[test]
    fn test_extracts_summary_fields() {
        let html = r#"<html><head>
            <title>Automations 101 | Academy</title>
            <meta name="description" content="Learn to automate reports.">
            </head><body>
            <h1>Automations 101</h1>
            <article>
              <p>First paragraph.</p>
              <p>Second paragraph.</p>
              <ol>
                <li>Connect your data source</li>
                <li>Short</li>
                <li>Schedule the workflow run</li>
              </ol>
            </article>
            <div class="post-tags"><a>automation</a><a>reports</a><span>automation</span></div>
            </body></html>"#;

        let details = run(html);
        assert_eq!(details.url, "https://example.test/video/1");
        assert_eq!(details.title, "Automations 101");
        assert_eq!(details.description.as_deref(), Some("Learn to automate reports."));
        assert_eq!(
            details.content_preview.as_deref(),
            Some("First paragraph. Second paragraph.")
        );
        assert_eq!(
            details.key_points,
            vec!["Connect your data source", "Schedule the workflow run"]
        );
        assert_eq!(details.tags, vec!["automation", "reports"]);
    }

    #[test]
    fn test_og_description_fallback() {
        let html = r#"<html><head>
            <meta property="og:description" content="Open graph text">
            </head><body></body></html>"#;
        assert_eq!(run(html).description.as_deref(), Some("Open graph text"));
    }

    #[test]
    fn test_numbered_lines() {
        let text = "  3. Export the results to a sheet\n\
                    3. too short\n\
                    3.No space after the dot here\n\
                    Version 3. of the product line\n\
                    1.  x\n\
                    12.\tStep text over fifteen chars";
        let lines: Vec<String> = numbered_lines(text).collect();
        assert_eq!(
            lines,
            vec!["Export the results to a sheet", "Step text over fifteen chars"]
        );
    }

    #[test]
    fn test_numbered_line_body_capped() {
        let text = format!("1. {}", "a".repeat(300));
        let lines: Vec<String> = numbered_lines(&text).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].chars().count(), MAX_KEY_POINT_CHARS);
    }

    #[test]
    fn test_numbered_lines_in_page_text() {
        let html = "<html><body><pre>\n1. Open the dashboard settings\n2. Enable the weekly export\n</pre></body></html>";
        let details = run(html);
        assert_eq!(
            details.key_points,
            vec!["Open the dashboard settings", "Enable the weekly export"]
        );
    }

    #[test]
    fn test_preview_root_priority() {
        let html = r#"<html><body>
            <p>Outside the main region.</p>
            <div class="entry-content"><p>Entry paragraph.</p></div>
            </body></html>"#;
        assert_eq!(run(html).content_preview.as_deref(), Some("Entry paragraph."));
    }

    #[test]
    fn test_key_points_capped_at_five() {
        let items: String = (1..=8)
            .map(|i| format!("<li>Key point number {i} of the list</li>"))
            .collect();
        let details = run(&format!("<html><body><ol>{items}</ol></body></html>"));
        assert_eq!(details.key_points.len(), 5);
        assert_eq!(details.key_points[0], "Key point number 1 of the list");
    }

    #[test]
    fn test_empty_page() {
        let details = run("<html><body></body></html>");
        assert!(details.title.is_empty());
        assert!(details.description.is_none());
        assert!(details.content_preview.is_none());
        assert!(details.key_points.is_empty());
        assert!(details.tags.is_empty());
    }
}
