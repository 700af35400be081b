use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    analysis::{self, dtos::ErrorResponse},
    app_state::AppState,
    credibility, health, history,
    middleware::rate_limit::{RateLimit, rate_limit_middleware},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        analysis::handlers::analyze,
        history::handlers::list_history,
        history::handlers::get_history_item,
        history::handlers::clear_history,
    ),
    components(schemas(
        analysis::dtos::AnalyzeRequest,
        ErrorResponse,
        analysis::ErrorKind,
        analysis::InputKind,
        credibility::AnalysisResult,
        credibility::CredibilityFactor,
        credibility::QuickIndicators,
        history::HistoryItem,
        history::HistorySource,
        health::HealthResponse,
    )),
    tags(
        (name = "analysis", description = "Article credibility analysis"),
        (name = "history", description = "Past analyses for this session"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// The full HTTP surface. Only `/v1/analyze` is rate limited since it is
/// the route that calls out to the network.
pub fn router(state: AppState, rate_limit: RateLimit) -> Router {
    let analyze = Router::new()
        .route("/v1/analyze", post(analysis::handlers::analyze))
        .route_layer(middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        .merge(analyze)
        .route(
            "/v1/history",
            get(history::handlers::list_history).delete(history::handlers::clear_history),
        )
        .route(
            "/v1/history/{id}",
            get(history::handlers::get_history_item),
        )
        .route("/healthz", get(health::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(
                    |request: &axum::http::Request<axum::body::Body>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or("-");
                        info_span!(
                            "http_request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    },
                ))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
