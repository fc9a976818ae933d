//! Extraction for pages rendered by a script-executing fetcher
//!
//! The browser evaluates [`build_extraction_script`] inside the rendered page.
//! The script returns a JSON payload of typed sections, which is mapped here
//! onto the same [`ContentBlock`]s the structural extractor produces.

use super::blocks::{
    truncate_chars, ContentBlock, PageResult, SeenText, MAX_CODE_CHARS, MIN_CODE_CHARS,
    MIN_PARAGRAPH_CHARS,
};
use super::structural::collapse;
use crate::config::ExtractConfig;
use crate::url::UrlKey;
use serde::{Deserialize, Serialize};

/// Payload returned by the in-page extraction script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<ScriptedSection>,
}

/// One element reported by the in-page script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptedSection {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    ListItem { text: String },
    Code { text: String },
    Quote { text: String },
}

impl ScriptedPage {
    /// Maps the reported sections to content blocks
    ///
    /// Consecutive list items are grouped into one unordered list. Text is
    /// deduplicated page-wide, as in structural extraction.
    pub fn into_page_result(self, url: &UrlKey) -> PageResult {
        let mut seen = SeenText::default();
        let mut blocks: Vec<ContentBlock> = Vec::new();
        let mut pending_items: Vec<String> = Vec::new();

        for section in self.sections {
            if let ScriptedSection::ListItem { text } = section {
                let text = collapse(&text);
                if !text.is_empty() && seen.claim(&text) {
                    pending_items.push(text);
                }
                continue;
            }

            flush_items(&mut pending_items, &mut blocks);

            let block = match section {
                ScriptedSection::Heading { level, text } => {
                    let text = collapse(&text);
                    (!text.is_empty()).then(|| ContentBlock::Heading {
                        level: level.clamp(1, 6),
                        text,
                    })
                }
                ScriptedSection::Paragraph { text } => {
                    let text = collapse(&text);
                    (text.chars().count() > MIN_PARAGRAPH_CHARS)
                        .then_some(ContentBlock::Paragraph { text })
                }
                ScriptedSection::Code { text } => {
                    let text = text.trim();
                    (text.chars().count() > MIN_CODE_CHARS).then(|| ContentBlock::Code {
                        text: truncate_chars(text, MAX_CODE_CHARS),
                    })
                }
                ScriptedSection::Quote { text } => {
                    let text = collapse(&text);
                    (!text.is_empty()).then_some(ContentBlock::Quote { text })
                }
                ScriptedSection::ListItem { .. } => None,
            };

            if let Some(block) = block {
                if seen.claim(block_text(&block)) {
                    blocks.push(block);
                }
            }
        }
        flush_items(&mut pending_items, &mut blocks);

        PageResult {
            url: url.clone(),
            title: collapse(&self.title),
            blocks,
        }
    }
}

fn flush_items(items: &mut Vec<String>, blocks: &mut Vec<ContentBlock>) {
    if items.is_empty() {
        return;
    }
    blocks.push(ContentBlock::List {
        ordered: false,
        items: std::mem::take(items),
    });
}

fn block_text(block: &ContentBlock) -> &str {
    match block {
        ContentBlock::Heading { text, .. }
        | ContentBlock::Paragraph { text }
        | ContentBlock::Code { text }
        | ContentBlock::Quote { text } => text,
        ContentBlock::List { .. } => "",
    }
}

/// Builds the in-page script for the configured selector tables
///
/// The script must be evaluated as a function expression; it resolves to a
/// value that deserializes into [`ScriptedPage`].
pub fn build_extraction_script(config: &ExtractConfig) -> String {
    // serde_json cannot fail on a Vec<String>
    let content = serde_json::to_string(&config.content_selectors).unwrap_or_else(|_| "[]".into());
    let boilerplate =
        serde_json::to_string(&config.boilerplate_selectors).unwrap_or_else(|_| "[]".into());
    let separators =
        serde_json::to_string(&config.title_separators).unwrap_or_else(|_| "[]".into());

    format!(
        r#"() => {{
    const contentSelectors = {content};
    const boilerplate = {boilerplate};
    const separators = {separators};
    const minRootText = {min_root};
    const result = {{ title: '', sections: [] }};

    const h1 = document.querySelector('h1');
    if (h1 && h1.innerText.trim()) {{
        result.title = h1.innerText.trim();
    }} else {{
        let title = document.title || '';
        for (const sep of separators) {{
            const idx = title.indexOf(sep);
            if (idx >= 0) {{ title = title.substring(0, idx); break; }}
        }}
        result.title = title.trim();
    }}

    let root = null;
    for (const sel of contentSelectors) {{
        const candidate = document.querySelector(sel);
        if (candidate && candidate.innerText.trim().length > minRootText) {{
            root = candidate;
            break;
        }}
    }}
    root = root || document.body;
    if (!root) return result;

    const skipped = (el) => boilerplate.some((sel) => {{
        try {{ return el.closest(sel) !== null; }} catch (e) {{ return false; }}
    }});

    root.querySelectorAll('h1, h2, h3, h4, h5, h6, p, li, pre, blockquote').forEach((el) => {{
        if (skipped(el)) return;
        const tag = el.tagName.toLowerCase();
        const text = el.innerText.trim();
        if (text.length < 3) return;

        if (tag.length === 2 && tag[0] === 'h') {{
            result.sections.push({{ type: 'heading', level: parseInt(tag[1], 10), text }});
        }} else if (tag === 'p') {{
            result.sections.push({{ type: 'paragraph', text }});
        }} else if (tag === 'li' && text.length > 10) {{
            result.sections.push({{ type: 'list_item', text }});
        }} else if (tag === 'pre') {{
            const code = el.querySelector('code');
            result.sections.push({{ type: 'code', text: (code ? code.innerText : text).trim() }});
        }} else if (tag === 'blockquote') {{
            result.sections.push({{ type: 'quote', text }});
        }}
    }});

    return result;
}}"#,
        min_root = config.min_root_text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_seed;

    fn url() -> UrlKey {
        normalize_seed("https://example.test/spa").unwrap()
    }

    #[test]
    fn test_payload_deserializes() {
        let json = r#"{
            "title": "Dashboard",
            "sections": [
                {"type": "heading", "level": 1, "text": "Dashboard"},
                {"type": "list_item", "text": "First bullet item"},
                {"type": "code", "text": "npm run build"}
            ]
        }"#;
        let page: ScriptedPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.title, "Dashboard");
        assert_eq!(page.sections.len(), 3);
        assert_eq!(
            page.sections[1],
            ScriptedSection::ListItem {
                text: "First bullet item".to_string()
            }
        );
    }

    #[test]
    fn test_sections_map_to_blocks() {
        let page = ScriptedPage {
            title: "  Reports  ".to_string(),
            sections: vec![
                ScriptedSection::Heading {
                    level: 2,
                    text: "Overview".to_string(),
                },
                ScriptedSection::ListItem {
                    text: "Export as spreadsheet".to_string(),
                },
                ScriptedSection::ListItem {
                    text: "Schedule weekly delivery".to_string(),
                },
                ScriptedSection::Paragraph {
                    text: "Reports summarize activity for a period.".to_string(),
                },
                ScriptedSection::ListItem {
                    text: "Share with the team members".to_string(),
                },
            ],
        };

        let result = page.into_page_result(&url());
        assert_eq!(result.title, "Reports");
        assert_eq!(
            result.blocks,
            vec![
                ContentBlock::Heading {
                    level: 2,
                    text: "Overview".to_string()
                },
                ContentBlock::List {
                    ordered: false,
                    items: vec![
                        "Export as spreadsheet".to_string(),
                        "Schedule weekly delivery".to_string()
                    ]
                },
                ContentBlock::Paragraph {
                    text: "Reports summarize activity for a period.".to_string()
                },
                ContentBlock::List {
                    ordered: false,
                    items: vec!["Share with the team members".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_scripted_dedup_and_thresholds() {
        let page = ScriptedPage {
            title: String::new(),
            sections: vec![
                ScriptedSection::Paragraph {
                    text: "Repeated paragraph text here.".to_string(),
                },
                ScriptedSection::Quote {
                    text: "Repeated paragraph text here.".to_string(),
                },
                ScriptedSection::Paragraph {
                    text: "short".to_string(),
                },
            ],
        };

        let result = page.into_page_result(&url());
        assert_eq!(result.blocks.len(), 1);
    }

    #[test]
    fn test_short_code_dropped_like_structural() {
        let page = ScriptedPage {
            title: String::new(),
            sections: vec![
                ScriptedSection::Code {
                    text: "  ls  ".to_string(),
                },
                ScriptedSection::Code {
                    text: "cargo build --release".to_string(),
                },
            ],
        };

        let result = page.into_page_result(&url());
        assert_eq!(
            result.blocks,
            vec![ContentBlock::Code {
                text: "cargo build --release".to_string()
            }]
        );

        let structural = crate::extract::StructuralExtractor::from_config(&ExtractConfig::default())
            .unwrap()
            .extract("<html><body><pre>ls</pre></body></html>", &url());
        assert!(structural.blocks.is_empty());
    }

    #[test]
    fn test_script_embeds_selectors() {
        let script = build_extraction_script(&ExtractConfig::default());
        assert!(script.starts_with("() => {"));
        assert!(script.contains("\".sidebar\""));
        assert!(script.contains("\"main article\""));
        assert!(script.contains("const minRootText = 100;"));
    }
}
