use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    analysis::dtos::ErrorResponse,
    app_state::AppState,
    history::{HistoryError, HistoryItem, Session},
};

fn history_unavailable(err: HistoryError) -> Response {
    error!(error = %err, "failed to read analysis history");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::message("Failed to load analysis history")),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/history",
    tag = "history",
    params(("x-session-id" = Option<String>, Header, description = "Session id; the session cookie is used when absent")),
    responses(
        (status = 200, description = "Past analyses of this session, newest first", body = [HistoryItem])
    )
)]
pub async fn list_history(State(state): State<AppState>, session: Session) -> Response {
    match state.history.list(&session.id) {
        Ok(items) => (StatusCode::OK, session, Json(items)).into_response(),
        Err(err) => history_unavailable(err),
    }
}

#[utoipa::path(
    get,
    path = "/v1/history/{id}",
    tag = "history",
    params(
        ("id" = String, Path, description = "History item id"),
        ("x-session-id" = Option<String>, Header, description = "Session id; the session cookie is used when absent")
    ),
    responses(
        (status = 200, description = "The stored analysis", body = HistoryItem),
        (status = 404, description = "No item with that id", body = ErrorResponse)
    )
)]
pub async fn get_history_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    match state.history.get(&session.id, &id) {
        Ok(Some(item)) => (StatusCode::OK, session, Json(item)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            session,
            Json(ErrorResponse::message("History item not found")),
        )
            .into_response(),
        Err(err) => history_unavailable(err),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/history",
    tag = "history",
    params(("x-session-id" = Option<String>, Header, description = "Session id; the session cookie is used when absent")),
    responses(
        (status = 204, description = "History of this session cleared")
    )
)]
pub async fn clear_history(State(state): State<AppState>, session: Session) -> Response {
    state.history.clear(&session.id);
    info!(session = %session.id, "analysis history cleared");
    (StatusCode::NO_CONTENT, session, ()).into_response()
}
