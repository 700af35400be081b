//! Google Gemini `generateContent` client with structured JSON output.
//!
//! The response schema travels in `generationConfig.responseSchema` together
//! with `responseMimeType: application/json`, so the model answers with a
//! single JSON document in the first candidate's text parts.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::genai::{GenerationError, GenerativeBackend, StructuredPrompt};

/// The key travels in a header so it never appears in request URLs or
/// in the errors reqwest renders from them.
const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const TEMPERATURE: f64 = 0.2;
const ERROR_BODY_PREVIEW: usize = 300;

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| GenerationError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request_body(prompt: &StructuredPrompt) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt.prompt }],
            }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "responseMimeType": "application/json",
                "responseSchema": prompt.schema,
            },
        })
    }

    fn map_http_error(status: StatusCode, body_text: &str) -> GenerationError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                GenerationError::Unauthorized(status)
            }
            _ => GenerationError::Http {
                status,
                message: body_text.chars().take(ERROR_BODY_PREVIEW).collect(),
            },
        }
    }

    /// Concatenate the text parts of the first candidate and parse them as JSON.
    fn parse_response(body: &Value) -> Result<Value, GenerationError> {
        let Some(candidate) = body["candidates"].as_array().and_then(|c| c.first()) else {
            let reason = body["promptFeedback"]["blockReason"]
                .as_str()
                .unwrap_or("empty candidates array");
            return Err(GenerationError::NoCandidates(reason.to_string()));
        };

        let text: String = candidate["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate["finishReason"].as_str().unwrap_or("no text parts");
            return Err(GenerationError::NoCandidates(reason.to_string()));
        }

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| GenerationError::InvalidJson(e.to_string()))
    }
}

/// Some models wrap JSON output in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    #[instrument(skip_all, fields(prompt = prompt.name, model = %self.model))]
    async fn generate_json(&self, prompt: &StructuredPrompt) -> Result<Value, GenerationError> {
        let body = Self::build_request_body(prompt);
        debug!(prompt_chars = prompt.prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::from_reqwest_error)?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(GenerationError::from_reqwest_error)?;

        if !status.is_success() {
            warn!(%status, "generateContent request failed");
            return Err(Self::map_http_error(status, &body_text));
        }

        let response_json: Value = serde_json::from_str(&body_text)
            .map_err(|e| GenerationError::InvalidJson(format!("response envelope: {e}")))?;

        Self::parse_response(&response_json)
    }
}
