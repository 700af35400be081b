//! Generative backend seam.
//!
//! Every model call in the crate goes through [`GenerativeBackend`]: a prompt
//! plus a response schema in, a JSON document out. The backend is treated as
//! untrusted; callers validate what comes back.

pub mod errors;
pub mod gemini;

pub use errors::GenerationError;
pub use gemini::GeminiBackend;

use async_trait::async_trait;
use serde_json::Value;

/// A single structured-output request.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPrompt {
    /// Short name used in logs, e.g. `extract_article`.
    pub name: &'static str,
    pub prompt: String,
    /// Response schema in the backend's OpenAPI subset.
    pub schema: Value,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run the prompt and return the model's JSON output, parsed but not
    /// checked against the schema.
    async fn generate_json(&self, prompt: &StructuredPrompt) -> Result<Value, GenerationError>;
}
