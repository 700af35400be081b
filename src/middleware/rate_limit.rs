use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::{net::SocketAddr, sync::Arc};
use tracing::warn;

use crate::analysis::dtos::ErrorResponse;

#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, RateLimitData>>,
    max_requests: u32,
    window_seconds: i64,
}

#[derive(Debug, Clone)]
struct RateLimitData {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            max_requests,
            window_seconds,
        }
    }

    /// Count one request from `client` and report whether it is allowed.
    pub fn check(&self, client: &str, now: DateTime<Utc>) -> bool {
        let mut entry = self
            .store
            .entry(client.to_string())
            .or_insert_with(|| RateLimitData {
                count: 0,
                window_start: now,
            });
        let data = entry.value_mut();

        if now.signed_duration_since(data.window_start) >= Duration::seconds(self.window_seconds) {
            data.count = 0;
            data.window_start = now;
        }

        data.count += 1;
        data.count <= self.max_requests
    }
}

/// IP-based rate limiting middleware. Requests without connection info
/// (in-process callers) share one bucket.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    req: Request,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "local".to_string());

    if !rate_limit.check(&client, Utc::now()) {
        warn!(%client, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::message("Rate limit exceeded")),
        )
            .into_response();
    }

    next.run(req).await
}
