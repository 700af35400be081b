use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http {
        status: reqwest::StatusCode,
        retriable: bool,
    },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("http client setup failed: {0}")]
    ClientBuild(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Transient failures that a bounded retry may clear.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::UnsupportedScheme(_)
            | Self::BodyTooLarge(_)
            | Self::UnsupportedContentType(_)
            | Self::RedirectLoop
            | Self::ClientBuild(_) => false,
            Self::Http { retriable, .. } => *retriable,

            Self::Connect(_)
            | Self::ConnectTimeout
            | Self::RequestTimeout
            | Self::Io(_)
            | Self::Unknown(_) => true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::RequestTimeout)
    }

    /// HTTP status of the page response, when the failure carried one.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::Http {
            status,
            retriable: status.is_server_error()
                || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else if err.is_connect() || err.is_request() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
