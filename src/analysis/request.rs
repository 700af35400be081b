use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use url::Url;
use utoipa::ToSchema;

use crate::analysis::errors::AnalysisError;

/// Which input mode a submission uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Url,
    Text,
}

impl Display for InputKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Url => f.write_str("url"),
            InputKind::Text => f.write_str("text"),
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(InputKind::Url),
            "text" => Ok(InputKind::Text),
            other => Err(format!("unknown input kind '{other}', expected 'url' or 'text'")),
        }
    }
}

/// A validated submission. Exactly one mode is active and a URL is always
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Url(Url),
    Text(String),
}

impl AnalysisRequest {
    /// Validate a raw `(kind, value)` pair. Empty values and relative or
    /// unparseable URLs are rejected before anything touches the network.
    /// Only the empty string counts as missing: whitespace-only text is
    /// left to the content length gate, and a blank URL fails to parse.
    pub fn parse(kind: InputKind, value: &str) -> Result<Self, AnalysisError> {
        if value.is_empty() {
            return Err(AnalysisError::input_required());
        }

        match kind {
            InputKind::Url => Url::parse(value.trim())
                .map(AnalysisRequest::Url)
                .map_err(|_| AnalysisError::invalid_url()),
            InputKind::Text => Ok(AnalysisRequest::Text(value.to_string())),
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            AnalysisRequest::Url(_) => InputKind::Url,
            AnalysisRequest::Text(_) => InputKind::Text,
        }
    }
}
