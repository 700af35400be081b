use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const INPUT_REQUIRED_MESSAGE: &str = "Input value is required.";
pub const INVALID_URL_MESSAGE: &str = "Please provide a valid absolute URL.";
pub const INSUFFICIENT_CONTENT_MESSAGE: &str = "Could not extract enough content to analyze.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze the article. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ErrorKind {
    /// Empty submission or an unparseable URL.
    InvalidInput,
    /// Fewer than the minimum number of characters to analyze.
    InsufficientContent,
    /// The article page could not be turned into text.
    FetchFailure,
    /// The assessment backend call failed.
    GenerationFailure,
    /// The assessment backend answered with something off-schema.
    MalformedResponse,
}

/// The single error type callers of the pipeline see: a message fit for
/// end users plus the kind it was classified as.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AnalysisError {
    kind: ErrorKind,
    message: String,
}

impl AnalysisError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn input_required() -> Self {
        Self::new(ErrorKind::InvalidInput, INPUT_REQUIRED_MESSAGE)
    }

    pub fn invalid_url() -> Self {
        Self::new(ErrorKind::InvalidInput, INVALID_URL_MESSAGE)
    }

    pub fn insufficient_content() -> Self {
        Self::new(ErrorKind::InsufficientContent, INSUFFICIENT_CONTENT_MESSAGE)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
