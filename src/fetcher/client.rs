use crate::fetcher::{decode, errors::FetchError, types::PageResponse};
use bytes::BytesMut;
use chrono::Utc;
use reqwest::{
    Client, ClientBuilder,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "NewsLensBot/0.1 (+https://newslens.example.com)";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Retrieves article pages over HTTP.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<PageResponse, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let url_final = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !decode::is_textual(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        // Content-Length may be missing (chunked) or describe the compressed
        // size, so the limit is enforced on the decoded stream.
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            let received = (body.len() + chunk.len()) as u64;
            if received > MAX_BODY_SIZE {
                return Err(FetchError::BodyTooLarge(received));
            }
            body.extend_from_slice(&chunk);
        }
        let body_raw = body.freeze();

        let (encoding, body_utf8) = decode::decode_body(&content_type, &body_raw);
        debug!(
            final_url = %url_final,
            charset = encoding.name(),
            bytes = body_raw.len(),
            "fetched article page"
        );

        Ok(PageResponse {
            url_final,
            status,
            content_type,
            body_raw,
            body_utf8,
            encoding,
            fetched_at: Utc::now(),
        })
    }
}
