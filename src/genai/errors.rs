use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation request timed out")]
    Timeout,

    #[error("backend unreachable: {0}")]
    Connect(String),

    #[error("backend rejected the credentials ({0})")]
    Unauthorized(StatusCode),

    #[error("backend returned http {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("backend returned no candidates: {0}")]
    NoCandidates(String),

    #[error("backend output is not valid json: {0}")]
    InvalidJson(String),

    #[error("http client setup failed: {0}")]
    ClientBuild(String),
}

impl GenerationError {
    /// Transient failures that a bounded retry may clear.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Http { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Unauthorized(_)
            | Self::NoCandidates(_)
            | Self::InvalidJson(_)
            | Self::ClientBuild(_) => false,
        }
    }

    /// The backend answered, but not with a parseable document.
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::InvalidJson(_))
    }

    /// The request URL is dropped from the message before it is kept.
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http {
                status,
                message: err.to_string(),
            }
        } else {
            Self::Connect(err.to_string())
        }
    }
}
