use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Only the head of the document is searched for a charset declaration.
const SNIFF_WINDOW: usize = 4096;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap(),
        Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap(),
    ]
});

fn encoding_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_ascii_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// Picks the body encoding: Content-Type header first, then the document's
/// own meta declarations, then a statistical guess.
pub fn sniff_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = encoding_from(&HEADER_CHARSET, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_WINDOW)];
    let head_str = String::from_utf8_lossy(head);
    if let Some(encoding) = META_PATTERNS
        .iter()
        .find_map(|pattern| encoding_from(pattern, &head_str))
    {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body.len() <= SNIFF_WINDOW);
    detector.guess(None, true)
}

/// Decodes the body to UTF-8. Malformed sequences become U+FFFD; article
/// text only has to be readable by the extraction model, not byte exact.
pub fn decode_body(content_type: &str, body: &[u8]) -> (&'static Encoding, String) {
    let encoding = sniff_encoding(content_type, body);
    let (decoded, used, had_errors) = encoding.decode(body);
    if had_errors {
        warn!(
            encoding = used.name(),
            "page body contained invalid byte sequences"
        );
    }
    (used, decoded.into_owned())
}

/// The lowercased media type of a Content-Type value, parameters dropped.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// True for the media types the extractor knows how to read.
pub fn is_textual(content_type: &str) -> bool {
    matches!(
        media_type(content_type).as_str(),
        "text/html" | "application/xhtml+xml" | "text/plain"
    )
}

pub fn is_plain_text(content_type: &str) -> bool {
    media_type(content_type) == "text/plain"
}
