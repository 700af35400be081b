use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::{AnalysisError, ErrorKind, InputKind};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub kind: InputKind,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
        }
    }
}

impl From<&AnalysisError> for ErrorResponse {
    fn from(err: &AnalysisError) -> Self {
        Self {
            error: err.message().to_string(),
            kind: Some(err.kind()),
        }
    }
}

/// Caller mistakes are 4xx; anything that went wrong upstream is 502.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::InsufficientContent => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::FetchFailure | ErrorKind::GenerationFailure | ErrorKind::MalformedResponse => {
            StatusCode::BAD_GATEWAY
        }
    }
}
