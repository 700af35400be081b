use whatlang::detect;

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_CHARS: usize = 50;

/// ISO 639-3 code of the article language, when detection is reliable.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    detect(text)
        .filter(|info| info.is_reliable() || info.confidence() >= MIN_CONFIDENCE)
        .map(|info| info.lang().code().to_string())
}
