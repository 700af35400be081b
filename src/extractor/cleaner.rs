use ammonia::Builder;
use scraper::{Html, Selector};

use crate::extractor::model::{PageMetadata, normalize_whitespace};

/// Upper bound on the markup handed to the extraction model.
pub const MAX_PROMPT_HTML_CHARS: usize = 100_000;

/// Structural tags kept so the model can still see paragraphs and headings.
const KEEP_TAGS: [&str; 28] = [
    "article", "main", "section", "div", "span", "p", "br", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "q", "ul", "ol", "li", "a", "em", "strong", "b", "i", "figure", "figcaption",
    "time", "pre", "code",
];

/// Dropped together with everything inside them.
const DROP_WITH_CONTENT: [&str; 12] = [
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg", "button",
];

fn sanitizer() -> Builder<'static> {
    let mut builder = Builder::empty();
    builder
        .add_tags(KEEP_TAGS)
        .add_clean_content_tags(DROP_WITH_CONTENT)
        .link_rel(None)
        .strip_comments(true);
    builder
}

/// Reduce a page to the markup worth sending to the model: boilerplate
/// regions removed, attributes stripped, whitespace collapsed and the
/// result capped at [`MAX_PROMPT_HTML_CHARS`].
pub fn prepare_for_extraction(html: &str) -> String {
    let cleaned = sanitizer().clean(html).to_string();
    truncate_chars(&normalize_whitespace(&cleaned), MAX_PROMPT_HTML_CHARS)
}

/// Cut on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Title and site name from OpenGraph tags, falling back to `<title>` and
/// the "Headline - Site" / "Headline | Site" convention.
pub fn read_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let og = |property: &str| -> Option<String> {
        let selector = Selector::parse(&format!("meta[property='{property}']")).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .find(|content| !content.is_empty())
    };

    let title_tag = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|title| !title.is_empty())
    });

    let site_from_title = title_tag.as_deref().and_then(|title| {
        [" - ", " | "]
            .iter()
            .find_map(|sep| title.rfind(sep).map(|pos| title[pos + sep.len()..].trim().to_string()))
            .filter(|site| !site.is_empty())
    });

    PageMetadata {
        title: og("og:title").or(title_tag),
        site_name: og("og:site_name").or(site_from_title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Council Approves Budget - Springfield Herald</title>
  <meta property="og:site_name" content="Springfield Herald">
  <style>body { color: red }</style>
  <script>trackVisitor();</script>
</head>
<body>
  <header><a href="/">Home</a> <a href="/sports">Sports</a></header>
  <nav><ul><li>Menu item</li></ul></nav>
  <article class="story" data-id="42">
    <h1 id="headline">Council Approves Budget</h1>
    <p style="font-weight:bold">The council voted 7-2 on Tuesday.</p>
    <p>Funding for transit rises by   12 percent.</p>
  </article>
  <aside>Advertisement: buy now</aside>
  <footer>Copyright 2024</footer>
</body>
</html>"#;

    #[test]
    fn removes_boilerplate_regions_with_their_content() {
        let prepared = prepare_for_extraction(PAGE);
        assert!(prepared.contains("The council voted 7-2 on Tuesday."));
        assert!(prepared.contains("Funding for transit rises by 12 percent."));
        assert!(!prepared.contains("trackVisitor"));
        assert!(!prepared.contains("color: red"));
        assert!(!prepared.contains("Menu item"));
        assert!(!prepared.contains("Advertisement"));
        assert!(!prepared.contains("Copyright"));
        assert!(!prepared.contains("Sports"));
    }

    #[test]
    fn strips_attributes_but_keeps_structure() {
        let prepared = prepare_for_extraction(PAGE);
        assert!(prepared.contains("<article>"));
        assert!(prepared.contains("<h1>Council Approves Budget</h1>"));
        assert!(!prepared.contains("class="));
        assert!(!prepared.contains("style="));
        assert!(!prepared.contains("data-id"));
    }

    #[test]
    fn caps_prompt_size() {
        let huge = format!("<p>{}</p>", "word ".repeat(MAX_PROMPT_HTML_CHARS));
        let prepared = prepare_for_extraction(&huge);
        assert_eq!(prepared.chars().count(), MAX_PROMPT_HTML_CHARS);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn reads_site_name_and_title() {
        let metadata = read_metadata(PAGE);
        assert_eq!(
            metadata.title.as_deref(),
            Some("Council Approves Budget - Springfield Herald")
        );
        assert_eq!(metadata.site_name.as_deref(), Some("Springfield Herald"));
    }

    #[test]
    fn og_title_wins_and_site_falls_back_to_title_suffix() {
        let html = r#"<html><head>
            <meta property="og:title" content="Storm hits coast">
            <title>Storm hits coast | Coastal Times</title>
        </head><body></body></html>"#;
        let metadata = read_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Storm hits coast"));
        assert_eq!(metadata.site_name.as_deref(), Some("Coastal Times"));
    }

    #[test]
    fn missing_metadata_is_none() {
        assert_eq!(read_metadata("<p>bare</p>"), PageMetadata::default());
    }
}
