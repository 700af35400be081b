use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// One scored credibility dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CredibilityFactor {
    /// 0-10, higher is more credible.
    pub score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VerifiedSources {
    Yes,
    Partial,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BiasLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FactAccuracy {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SourceQuality {
    High,
    Moderate,
    Low,
}

/// Categorical shorthand produced alongside the numeric factors.
///
/// These are generated independently of the scores and are not reconciled
/// with them: `bias_level: Low` next to a low `bias.score` is possible and is
/// passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickIndicators {
    pub verified_sources: VerifiedSources,
    pub bias_level: BiasLevel,
    pub fact_accuracy: FactAccuracy,
    pub source_quality: SourceQuality,
}

/// The credibility report for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_credibility_score: f64,
    pub article_summary: String,
    pub bias: CredibilityFactor,
    pub citations: CredibilityFactor,
    pub facts: CredibilityFactor,
    pub source: CredibilityFactor,
    pub quick_indicators: QuickIndicators,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    #[error("{0}")]
    Shape(String),

    #[error("{field} score {value} is outside [0, 10]")]
    ScoreOutOfRange { field: &'static str, value: f64 },
}

impl AnalysisResult {
    /// Deserialize untrusted model output and enforce the score bounds.
    /// Missing fields and unknown indicator values fail during
    /// deserialization; scores are checked afterwards.
    pub fn from_model_output(output: Value) -> Result<Self, SchemaViolation> {
        let result: Self =
            serde_json::from_value(output).map_err(|e| SchemaViolation::Shape(e.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let scores = [
            ("overallCredibilityScore", self.overall_credibility_score),
            ("bias", self.bias.score),
            ("citations", self.citations.score),
            ("facts", self.facts.score),
            ("source", self.source.score),
        ];
        for (field, value) in scores {
            if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(SchemaViolation::ScoreOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// The four factors in display order.
    pub fn factors(&self) -> [(&'static str, &CredibilityFactor); 4] {
        [
            ("bias", &self.bias),
            ("citations", &self.citations),
            ("facts", &self.facts),
            ("source", &self.source),
        ]
    }
}
