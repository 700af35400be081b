use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Article text pulled from a page, plus what we learned about the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub url: Url,
    pub title: Option<String>,
    pub site_name: Option<String>,
    pub language: Option<String>,
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

/// Page-level metadata read straight from the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub site_name: Option<String>,
}

static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\f]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Collapse runs of spaces and blank lines, keeping paragraph breaks.
pub fn normalize_whitespace(text: &str) -> String {
    let spaced = HORIZONTAL_SPACE.replace_all(text.trim(), " ");
    BLANK_LINES.replace_all(&spaced, "\n\n").into_owned()
}
