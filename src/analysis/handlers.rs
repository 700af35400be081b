use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    analysis::dtos::{AnalyzeRequest, ErrorResponse, status_for},
    app_state::AppState,
    history::{HistoryItem, HistorySource, Session},
};

#[utoipa::path(
    post,
    path = "/v1/analyze",
    tag = "analysis",
    request_body = AnalyzeRequest,
    params(("x-session-id" = Option<String>, Header, description = "Session the result is recorded under; the session cookie is used when absent")),
    responses(
        (status = 200, description = "Analysis completed and recorded", body = HistoryItem),
        (status = 400, description = "Empty input or invalid URL", body = ErrorResponse),
        (status = 422, description = "Not enough content to analyze", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 502, description = "Retrieval or assessment failed", body = ErrorResponse)
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    let result = match state
        .analyzer
        .run_analysis(payload.kind, &payload.value)
        .await
    {
        Ok(result) => result,
        Err(err) => {
            return (status_for(err.kind()), session, Json(ErrorResponse::from(&err)))
                .into_response();
        }
    };

    let source = HistorySource {
        kind: payload.kind,
        value: payload.value,
    };
    match state.history.record(&session.id, source, result) {
        Ok(item) => {
            info!(id = %item.id, session = %session.id, "analysis recorded");
            (StatusCode::OK, session, Json(item)).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to record analysis");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::message("Failed to save analysis history")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::credibility::{
        AnalysisResult, BiasLevel, CredibilityFactor, FactAccuracy, MockAssessor,
        QuickIndicators, SourceQuality, VerifiedSources,
    };
    use crate::extractor::MockArticleSource;
    use crate::history::SessionId;
    use crate::history::session::SESSION_HEADER;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header::CONTENT_TYPE},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn report() -> AnalysisResult {
        let factor = CredibilityFactor {
            score: 7.0,
            summary: "Reasonable".to_string(),
        };
        AnalysisResult {
            overall_credibility_score: 7.0,
            article_summary: "A council voted on a transit budget after a long public hearing."
                .to_string(),
            bias: factor.clone(),
            citations: factor.clone(),
            facts: factor.clone(),
            source: factor,
            quick_indicators: QuickIndicators {
                verified_sources: VerifiedSources::Partial,
                bias_level: BiasLevel::Low,
                fact_accuracy: FactAccuracy::Good,
                source_quality: SourceQuality::Moderate,
            },
        }
    }

    fn create_test_app(assessor: MockAssessor) -> (Router, AppState) {
        let state = AppState::new(Analyzer::new(
            Arc::new(MockArticleSource::new()),
            Arc::new(assessor),
        ));
        let app = Router::new()
            .route("/v1/analyze", post(analyze))
            .with_state(state.clone());
        (app, state)
    }

    fn analyze_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/analyze")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn session_of(response: &Response) -> SessionId {
        response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(SessionId::parse)
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_text_returns_recorded_item() {
        let mut assessor = MockAssessor::new();
        assessor.expect_assess().times(1).returning(|_| Ok(report()));
        let (app, state) = create_test_app(assessor);

        let response = app
            .oneshot(analyze_request(json!({ "kind": "text", "value": "x".repeat(120) })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let session = session_of(&response);
        let body = json_body(response).await;
        assert_eq!(body["source"]["type"], "text");
        assert_eq!(body["result"]["overallCredibilityScore"], 7.0);
        assert_eq!(
            body["title"],
            "A council voted on a transit budget after a long p..."
        );
        assert_eq!(state.history.list(&session).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analysis_is_recorded_under_callers_session() {
        let mut assessor = MockAssessor::new();
        assessor.expect_assess().times(1).returning(|_| Ok(report()));
        let (app, state) = create_test_app(assessor);
        let caller = SessionId::new();

        let mut request = analyze_request(json!({ "kind": "text", "value": "x".repeat(120) }));
        request
            .headers_mut()
            .insert(SESSION_HEADER, caller.to_string().parse().unwrap());
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(session_of(&response), caller);
        assert_eq!(state.history.list(&caller).unwrap().len(), 1);
        assert!(state.history.list(&SessionId::new()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_value_is_bad_request() {
        let mut assessor = MockAssessor::new();
        assessor.expect_assess().times(0);
        let (app, state) = create_test_app(assessor);

        let response = app
            .oneshot(analyze_request(json!({ "kind": "url", "value": "" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let session = session_of(&response);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Input value is required.", "kind": "InvalidInput" })
        );
        assert!(state.history.list(&session).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_text_is_unprocessable() {
        let (app, _) = create_test_app(MockAssessor::new());

        let response = app
            .oneshot(analyze_request(json!({ "kind": "text", "value": "too short" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["kind"], "InsufficientContent");
    }

    #[tokio::test]
    async fn test_assessment_failure_is_bad_gateway() {
        let mut assessor = MockAssessor::new();
        assessor.expect_assess().returning(|_| {
            Err(crate::credibility::AssessError::Malformed(
                "missing bias".to_string(),
            ))
        });
        let (app, _) = create_test_app(assessor);

        let response = app
            .oneshot(analyze_request(json!({ "kind": "text", "value": "y".repeat(150) })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            json_body(response).await,
            json!({
                "error": "Failed to analyze the article. Please try again.",
                "kind": "MalformedResponse"
            })
        );
    }
}
