use bytes::Bytes;
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use reqwest::StatusCode;
use url::Url;

/// A fetched article page, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub content_type: String,
    pub body_raw: Bytes,
    pub body_utf8: String,
    pub encoding: &'static Encoding,
    pub fetched_at: DateTime<Utc>,
}

impl PageResponse {
    /// Canonical name of the charset the body was decoded with.
    pub fn charset(&self) -> &'static str {
        self.encoding.name()
    }
}
