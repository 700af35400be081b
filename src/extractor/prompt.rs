use serde::Deserialize;
use serde_json::{Value, json};

use crate::genai::StructuredPrompt;

#[derive(Debug, Deserialize)]
struct ExtractionOutput {
    content: String,
}

pub fn extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "content": {
                "type": "STRING",
                "description": "The extracted text content of the article."
            }
        },
        "required": ["content"]
    })
}

pub fn extraction_prompt(html: &str, title_hint: Option<&str>) -> StructuredPrompt {
    let hint = title_hint
        .map(|title| format!("The page title is: {title}\n\n"))
        .unwrap_or_default();

    StructuredPrompt {
        name: "extract_article",
        prompt: format!(
            "Extract the main article text from the following HTML content. Focus on the \
             primary content and exclude headers, footers, ads, and navigation menus. \
             Return plain text only, with paragraphs separated by blank lines.\n\n\
             {hint}HTML:\n{html}"
        ),
        schema: extraction_schema(),
    }
}

/// Pull `content` out of the model output. Anything else is malformed.
pub fn parse_extraction(output: Value) -> Result<String, String> {
    serde_json::from_value::<ExtractionOutput>(output)
        .map(|out| out.content)
        .map_err(|e| e.to_string())
}
