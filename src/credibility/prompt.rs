use serde_json::{Value, json};

use crate::genai::StructuredPrompt;

fn factor_schema(what: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "NUMBER",
                "minimum": 0,
                "maximum": 10,
                "description": format!("{what} score (0-10)")
            },
            "summary": {
                "type": "STRING",
                "description": format!("Summary of the {} analysis.", what.to_lowercase())
            }
        },
        "required": ["score", "summary"]
    })
}

fn enum_schema(values: &[&str], description: &str) -> Value {
    json!({ "type": "STRING", "enum": values, "description": description })
}

/// Response schema for the credibility report, bounds and enumerations included.
pub fn credibility_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallCredibilityScore": {
                "type": "NUMBER",
                "minimum": 0,
                "maximum": 10,
                "description": "The overall credibility score of the news article (0-10)."
            },
            "articleSummary": {
                "type": "STRING",
                "description": "A concise summary of the news article."
            },
            "bias": factor_schema("Bias"),
            "citations": factor_schema("Citations"),
            "facts": factor_schema("Facts"),
            "source": factor_schema("Source"),
            "quickIndicators": {
                "type": "OBJECT",
                "properties": {
                    "verifiedSources": enum_schema(&["Yes", "Partial", "No"], "Whether the article uses verified sources."),
                    "biasLevel": enum_schema(&["Low", "Medium", "High"], "The overall bias level detected."),
                    "factAccuracy": enum_schema(&["Good", "Fair", "Poor"], "The accuracy of the facts presented."),
                    "sourceQuality": enum_schema(&["High", "Moderate", "Low"], "The quality of the news source.")
                },
                "required": ["verifiedSources", "biasLevel", "factAccuracy", "sourceQuality"]
            }
        },
        "required": [
            "overallCredibilityScore",
            "articleSummary",
            "bias",
            "citations",
            "facts",
            "source",
            "quickIndicators"
        ]
    })
}

const INSTRUCTIONS: &str = "You are an assistant that analyzes the credibility of news articles.

Based on the article content provided, evaluate it for factual accuracy, bias, and source reliability, and answer with JSON containing:

- overallCredibilityScore: a single score from 0-10 for the overall credibility.
- articleSummary: a brief, neutral summary of the main points of the article.
- bias: score from 0-10 (10 is completely neutral) and a concise explanation of the bias finding.
- citations: score from 0-10 for the quality and verifiability of the sources cited, with an explanation.
- facts: score from 0-10 for the factual accuracy of the claims, with an explanation.
- source: score from 0-10 for the likely reliability of the source (make an educated guess from content and tone if the outlet is unknown), with an explanation.
- quickIndicators: verifiedSources (Yes, Partial or No), biasLevel (Low, Medium or High), factAccuracy (Good, Fair or Poor), sourceQuality (High, Moderate or Low).";

pub fn credibility_prompt(article_content: &str) -> StructuredPrompt {
    StructuredPrompt {
        name: "assess_credibility",
        prompt: format!("{INSTRUCTIONS}\n\nArticle Content: {article_content}"),
        schema: credibility_schema(),
    }
}
