use serde::Deserialize;
use std::fmt;

/// What a run extracts from each page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Classified content blocks, merged into one document with a TOC
    #[default]
    Document,
    /// Per-page summary records exported as JSON
    Details,
}

/// Words that suggest the caller wants summaries rather than full text
const DETAIL_HINTS: &[&str] = &[
    "description",
    "summary",
    "summaries",
    "detail",
    "learnings",
    "key points",
    "takeaway",
    "tags",
    "preview",
];

impl ExtractionMode {
    /// Best-effort guess from a free-text description of what to extract
    ///
    /// Unknown hints fall back to [`ExtractionMode::Document`]. This never
    /// influences the structural extractor; callers opt in by using the result.
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.to_lowercase();
        if DETAIL_HINTS.iter().any(|word| hint.contains(word)) {
            Self::Details
        } else {
            Self::Document
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Details => "details",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
