//! The analysis pipeline entry point.
//!
//! `Idle -> Extracting (url only) -> Validating -> Assessing -> Done`, or
//! `Failed` from any stage. Each invocation is independent: nothing is
//! cached or shared between calls and nothing is retried at this level.

pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod request;

pub use errors::{AnalysisError, ErrorKind};
pub use request::{AnalysisRequest, InputKind};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{Instrument, debug, error, info, info_span};

use crate::config::{Config, ConfigError};
use crate::credibility::{AnalysisResult, AssessError, Assessor, CredibilityAssessor};
use crate::extractor::{ArticleSource, ContentExtractor, ExtractError, RETRIEVAL_FAILED_MESSAGE};
use crate::fetcher::{FetchError, Fetcher};
use crate::genai::{GeminiBackend, GenerationError, GenerativeBackend};
use crate::retry::RetryPolicy;

/// Content shorter than this (in characters) is not sent for assessment.
pub const MIN_CONTENT_CHARS: usize = 100;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Failures while wiring the pipeline together at startup.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build page fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("failed to build generative backend: {0}")]
    Backend(#[from] GenerationError),
}

pub struct Analyzer {
    source: Arc<dyn ArticleSource>,
    assessor: Arc<dyn Assessor>,
}

impl Analyzer {
    pub fn new(source: Arc<dyn ArticleSource>, assessor: Arc<dyn Assessor>) -> Self {
        Self { source, assessor }
    }

    /// The production pipeline: one Gemini backend shared by the extractor
    /// and the assessor.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let backend: Arc<dyn GenerativeBackend> = Arc::new(GeminiBackend::new(
            config.gemini_base_url(),
            config.require_api_key()?,
            config.gemini_model(),
            config.generation_timeout(),
        )?);
        let retry = RetryPolicy::new(
            config.retry_max_attempts(),
            config.retry_base_delay(),
            MAX_RETRY_DELAY,
        );

        let extractor =
            ContentExtractor::new(Fetcher::new(config.fetch_timeout())?, backend.clone(), retry);
        let assessor = CredibilityAssessor::new(backend, retry);

        info!(
            model = config.gemini_model(),
            max_attempts = retry.max_attempts(),
            "analysis pipeline ready"
        );
        Ok(Self::new(Arc::new(extractor), Arc::new(assessor)))
    }

    /// Validate a raw submission and run it through the pipeline.
    pub async fn run_analysis(
        &self,
        kind: InputKind,
        value: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request = AnalysisRequest::parse(kind, value).inspect_err(|err| {
            info!(%kind, error_kind = ?err.kind(), "rejected analysis input");
        })?;
        self.run(request).await
    }

    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let span = info_span!("analysis", kind = %request.kind());
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let content = match request {
            AnalysisRequest::Url(url) => {
                debug!(stage = "extracting", %url);
                self.source
                    .extract(&url)
                    .await
                    .map_err(|err| flatten_extract_error(&url, err))?
                    .content
            }
            AnalysisRequest::Text(text) => text,
        };

        debug!(stage = "validating", content_chars = content.chars().count());
        check_content_length(&content)?;

        debug!(stage = "assessing");
        let result = self
            .assessor
            .assess(&content)
            .await
            .map_err(flatten_assess_error)?;

        info!(
            overall = result.overall_credibility_score,
            "analysis complete"
        );
        Ok(result)
    }
}

/// The content gate. Exactly [`MIN_CONTENT_CHARS`] characters pass.
pub fn check_content_length(content: &str) -> Result<(), AnalysisError> {
    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS {
        info!(content_chars = chars, "content below analysis threshold");
        return Err(AnalysisError::insufficient_content());
    }
    Ok(())
}

fn flatten_extract_error(url: &url::Url, err: ExtractError) -> AnalysisError {
    error!(
        %url,
        page_status = err.page_status().map(|status| status.as_u16()),
        timed_out = err.is_timeout(),
        error = %err,
        "failed to fetch or process url content"
    );
    AnalysisError::new(ErrorKind::FetchFailure, RETRIEVAL_FAILED_MESSAGE)
}

fn flatten_assess_error(err: AssessError) -> AnalysisError {
    let kind = match &err {
        AssessError::Generation(_) => ErrorKind::GenerationFailure,
        AssessError::Malformed(_) => ErrorKind::MalformedResponse,
    };
    error!(error_kind = ?kind, error = %err, "credibility assessment failed");
    AnalysisError::new(kind, errors::ANALYSIS_FAILED_MESSAGE)
}
