//! Article text -> validated credibility report.

pub mod prompt;
pub mod types;

pub use types::{
    AnalysisResult, BiasLevel, CredibilityFactor, FactAccuracy, QuickIndicators, SchemaViolation,
    SourceQuality, VerifiedSources,
};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::genai::{GenerationError, GenerativeBackend};
use crate::retry::RetryPolicy;

#[derive(Error, Debug)]
pub enum AssessError {
    #[error("assessment model call failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("assessment output malformed: {0}")]
    Malformed(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, content: &str) -> Result<AnalysisResult, AssessError>;
}

/// Asks the generative backend for a report and refuses anything that does
/// not match the schema.
pub struct CredibilityAssessor {
    backend: Arc<dyn GenerativeBackend>,
    retry: RetryPolicy,
}

impl CredibilityAssessor {
    pub fn new(backend: Arc<dyn GenerativeBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }
}

#[async_trait]
impl Assessor for CredibilityAssessor {
    #[instrument(skip_all, fields(content_chars = content.chars().count()))]
    async fn assess(&self, content: &str) -> Result<AnalysisResult, AssessError> {
        let request = prompt::credibility_prompt(content);

        // Only transport-level failures are retried; a schema violation is final.
        let output = self
            .retry
            .run("assess_credibility", || self.backend.generate_json(&request))
            .await
            .map_err(|err| {
                if err.is_malformed_output() {
                    AssessError::Malformed(err.to_string())
                } else {
                    AssessError::Generation(err)
                }
            })?;

        let result = AnalysisResult::from_model_output(output).map_err(|violation| {
            warn!(%violation, "credibility output failed validation");
            AssessError::Malformed(violation.to_string())
        })?;

        info!(
            overall = result.overall_credibility_score,
            bias_level = ?result.quick_indicators.bias_level,
            "credibility assessment complete"
        );
        Ok(result)
    }
}
