use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::extractor::{ArticleSource, ContentExtractor, ExtractError};
use crate::fetcher::{FetchError, Fetcher};
use crate::genai::{GenerationError, MockGenerativeBackend};
use crate::retry::RetryPolicy;

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html><head>
  <title>Council Approves Transit Budget - Springfield Herald</title>
  <script>window.ads = [];</script>
</head><body>
  <nav>Home | Politics | Sports</nav>
  <article>
    <h1>Council Approves Transit Budget</h1>
    <p>The Springfield city council voted 7-2 on Tuesday to approve a budget that raises transit funding.</p>
  </article>
  <footer>Copyright Springfield Herald</footer>
</body></html>"#;

const ARTICLE_TEXT: &str = "The Springfield city council voted 7-2 on Tuesday to approve a budget \
                            that raises transit funding by twelve percent over last year.";

fn extractor(backend: MockGenerativeBackend, retry: RetryPolicy) -> ContentExtractor {
    ContentExtractor::new(
        Fetcher::new(Duration::from_secs(5)).unwrap(),
        Arc::new(backend),
        retry,
    )
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) -> Url {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(body.as_bytes())
        .insert_header("Content-Type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_extracts_article_through_backend() {
    let server = MockServer::start().await;
    let url = serve(&server, "/news/budget", html_page(ARTICLE_HTML)).await;

    let mut backend = MockGenerativeBackend::new();
    backend
        .expect_generate_json()
        .withf(|prompt| {
            prompt.name == "extract_article"
                && prompt.prompt.contains("voted 7-2 on Tuesday")
                && !prompt.prompt.contains("window.ads")
                && !prompt.prompt.contains("Politics | Sports")
        })
        .times(1)
        .returning(|_| Ok(json!({ "content": ARTICLE_TEXT })));

    let article = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap();

    assert_eq!(article.content, ARTICLE_TEXT);
    assert_eq!(article.url, url);
    assert_eq!(
        article.title.as_deref(),
        Some("Council Approves Transit Budget - Springfield Herald")
    );
    assert_eq!(article.site_name.as_deref(), Some("Springfield Herald"));
    assert_eq!(article.language.as_deref(), Some("eng"));
}

#[tokio::test]
async fn test_http_error_skips_backend() {
    let server = MockServer::start().await;
    let url = serve(&server, "/missing", ResponseTemplate::new(404)).await;

    let mut backend = MockGenerativeBackend::new();
    backend.expect_generate_json().times(0);

    let err = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap_err();
    assert_eq!(err.page_status().map(|s| s.as_u16()), Some(404));

    match err {
        ExtractError::Fetch(FetchError::Http { status, retriable }) => {
            assert_eq!(status.as_u16(), 404);
            assert!(!retriable);
        }
        other => panic!("expected http fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_short_extraction_is_returned_as_is() {
    let server = MockServer::start().await;
    let url = serve(&server, "/stub", html_page("<p>Tiny page</p>")).await;

    let mut backend = MockGenerativeBackend::new();
    backend
        .expect_generate_json()
        .returning(|_| Ok(json!({ "content": "Tiny page" })));

    let article = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap();
    assert_eq!(article.content, "Tiny page");
    assert_eq!(article.language, None);
}

#[tokio::test]
async fn test_malformed_backend_output() {
    let server = MockServer::start().await;
    let url = serve(&server, "/article", html_page(ARTICLE_HTML)).await;

    let mut backend = MockGenerativeBackend::new();
    backend
        .expect_generate_json()
        .returning(|_| Ok(json!({ "text": "wrong field" })));

    let err = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Malformed(_)));
}

#[tokio::test]
async fn test_backend_failure_is_generation_error() {
    let server = MockServer::start().await;
    let url = serve(&server, "/article", html_page(ARTICLE_HTML)).await;

    let mut backend = MockGenerativeBackend::new();
    backend
        .expect_generate_json()
        .times(1)
        .returning(|_| Err(GenerationError::Timeout));

    let err = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Generation(GenerationError::Timeout)));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_transient_backend_failure_is_retried_when_enabled() {
    let server = MockServer::start().await;
    let url = serve(&server, "/article", html_page(ARTICLE_HTML)).await;

    let mut backend = MockGenerativeBackend::new();
    let mut seq = mockall::Sequence::new();
    backend
        .expect_generate_json()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(GenerationError::Connect("reset by peer".into())));
    backend
        .expect_generate_json()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(json!({ "content": ARTICLE_TEXT })));

    let retry = RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(2));
    let article = extractor(backend, retry).extract(&url).await.unwrap();
    assert_eq!(article.content, ARTICLE_TEXT);
}

#[tokio::test]
async fn test_plain_text_page_is_sent_unsanitized() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/plain",
        ResponseTemplate::new(200)
            .set_body_bytes("Fish & chips prices rise <again>".as_bytes())
            .insert_header("Content-Type", "text/plain; charset=utf-8"),
    )
    .await;

    let mut backend = MockGenerativeBackend::new();
    backend
        .expect_generate_json()
        .withf(|prompt| prompt.prompt.contains("Fish & chips prices rise <again>"))
        .returning(|_| Ok(json!({ "content": "Fish & chips prices rise again" })));

    let article = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap();
    assert_eq!(article.content, "Fish & chips prices rise again");
}

#[tokio::test]
async fn test_uppercase_plain_text_skips_sanitizer() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/shouty",
        ResponseTemplate::new(200)
            .set_body_bytes("Prices rise <again> & again".as_bytes())
            .insert_header("Content-Type", "TEXT/PLAIN; charset=utf-8"),
    )
    .await;

    let mut backend = MockGenerativeBackend::new();
    backend
        .expect_generate_json()
        .withf(|prompt| prompt.prompt.contains("Prices rise <again> & again"))
        .times(1)
        .returning(|_| Ok(json!({ "content": "Prices rise again and again" })));

    let article = extractor(backend, RetryPolicy::single_attempt())
        .extract(&url)
        .await
        .unwrap();
    assert_eq!(article.content, "Prices rise again and again");
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use crate::analysis::{MIN_CONTENT_CHARS, check_content_length};
    use crate::extractor::cleaner::{
        MAX_PROMPT_HTML_CHARS, prepare_for_extraction, read_metadata, truncate_chars,
    };
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_prepare_never_panics_and_stays_bounded(html in ".*") {
            let prepared = prepare_for_extraction(&html);
            prop_assert!(prepared.chars().count() <= MAX_PROMPT_HTML_CHARS);
            prop_assert!(!prepared.to_ascii_lowercase().contains("<script"));
        }

        #[test]
        fn test_read_metadata_never_panics(html in ".*") {
            let _ = read_metadata(&html);
        }

        #[test]
        fn test_truncate_is_a_char_prefix(text in ".*", max in 0usize..64) {
            let cut = truncate_chars(&text, max);
            prop_assert!(text.starts_with(&cut));
            prop_assert_eq!(cut.chars().count(), text.chars().count().min(max));
        }

        #[test]
        fn test_gate_matches_char_count(text in ".{0,200}") {
            let allowed = check_content_length(&text).is_ok();
            prop_assert_eq!(allowed, text.chars().count() >= MIN_CONTENT_CHARS);
        }
    }
}
