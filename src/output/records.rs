//! Normalized export records
//!
//! Page summaries and failed pages both go through an adapter into
//! [`PageRecord`], so the export never has to guess at a record's shape.

use crate::extract::PageDetails;
use crate::url::UrlKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One exported page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    /// Record for a page summary
    pub fn from_details(details: PageDetails) -> Self {
        Self {
            title: non_empty(&details.title),
            url: details.url,
            description: details.description,
            content_preview: details.content_preview,
            key_points: details.key_points,
            tags: details.tags,
            ..Self::default()
        }
    }

    /// Record for a page that could not be processed
    pub fn failed(url: &UrlKey, error: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Top-level shape of the JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordExport {
    pub timestamp: DateTime<Utc>,
    pub count: usize,
    pub items: Vec<PageRecord>,
}

impl RecordExport {
    pub fn new(items: Vec<PageRecord>) -> Self {
        Self {
            timestamp: Utc::now(),
            count: items.len(),
            items,
        }
    }
}

/// Writes `records` as pretty-printed JSON to `path`
pub fn write_records(path: &Path, records: Vec<PageRecord>) -> Result<(), crate::BinderError> {
    let export = RecordExport::new(records);
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    let failed = export.items.iter().filter(|r| r.is_failed()).count();
    tracing::info!(
        "Wrote {} records ({} failed) to {}",
        export.count,
        failed,
        path.display()
    );
    Ok(())
}
