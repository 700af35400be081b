//! URL -> article text.
//!
//! The page is fetched, reduced to its content-bearing markup and handed to
//! the generative backend, which returns the article body as plain text.
//! No minimum length is enforced here; that gate belongs to the caller.

pub mod cleaner;
pub mod language;
pub mod model;
pub mod prompt;

#[cfg(test)]
mod tests;

pub use model::{ExtractedArticle, PageMetadata};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::fetcher::{FetchError, Fetcher, PageResponse, decode};
use crate::genai::{GenerationError, GenerativeBackend};
use crate::retry::RetryPolicy;

/// Shown to users for every extraction failure; the cause is only logged.
pub const RETRIEVAL_FAILED_MESSAGE: &str =
    "Could not retrieve content from the provided URL. Please check the URL and try again.";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction model call failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("extraction output malformed: {0}")]
    Malformed(String),
}

impl ExtractError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Fetch(err) => err.is_timeout(),
            Self::Generation(err) => matches!(err, GenerationError::Timeout),
            Self::Malformed(_) => false,
        }
    }

    /// Status of the article page when the failure was a non-success response.
    pub fn page_status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Fetch(err) => err.status(),
            _ => None,
        }
    }
}

/// Anything that can turn an article URL into article text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<ExtractedArticle, ExtractError>;
}

pub struct ContentExtractor {
    fetcher: Fetcher,
    backend: Arc<dyn GenerativeBackend>,
    retry: RetryPolicy,
}

impl ContentExtractor {
    pub fn new(fetcher: Fetcher, backend: Arc<dyn GenerativeBackend>, retry: RetryPolicy) -> Self {
        Self {
            fetcher,
            backend,
            retry,
        }
    }

    async fn extract_text(&self, page: &PageResponse, title: Option<&str>) -> Result<String, ExtractError> {
        let markup = if decode::is_plain_text(&page.content_type) {
            cleaner::truncate_chars(&page.body_utf8, cleaner::MAX_PROMPT_HTML_CHARS)
        } else {
            cleaner::prepare_for_extraction(&page.body_utf8)
        };
        let request = prompt::extraction_prompt(&markup, title);

        let output = self
            .retry
            .run("extract_article", || self.backend.generate_json(&request))
            .await
            .map_err(|err| {
                if err.is_malformed_output() {
                    ExtractError::Malformed(err.to_string())
                } else {
                    ExtractError::Generation(err)
                }
            })?;

        let text = prompt::parse_extraction(output).map_err(ExtractError::Malformed)?;
        Ok(model::normalize_whitespace(&text))
    }
}

#[async_trait]
impl ArticleSource for ContentExtractor {
    #[instrument(skip_all, fields(url = %url))]
    async fn extract(&self, url: &Url) -> Result<ExtractedArticle, ExtractError> {
        let page = self
            .retry
            .run("fetch_page", || self.fetcher.fetch(url))
            .await?;

        let metadata = cleaner::read_metadata(&page.body_utf8);
        let content = self.extract_text(&page, metadata.title.as_deref()).await?;
        let language = language::detect_language(&content);

        info!(
            final_url = %page.url_final,
            status = %page.status,
            charset = page.charset(),
            html_bytes = page.body_raw.len(),
            content_chars = content.chars().count(),
            language = language.as_deref().unwrap_or("unknown"),
            "extracted article content"
        );

        Ok(ExtractedArticle {
            url: page.url_final,
            title: metadata.title,
            site_name: metadata.site_name,
            language,
            content,
            fetched_at: page.fetched_at,
        })
    }
}
