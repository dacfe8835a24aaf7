use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    error::AppResult,
    middleware::auth::Session,
    models::Notification,
    response::ApiResponse,
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", post(mark_read))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications for the caller, newest first", body = ApiResponse<Vec<Notification>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let resp = notification_service::list_notifications(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    responses(
        (status = 200, description = "Unread notification count", body = ApiResponse<usize>)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<usize>>> {
    let resp = notification_service::unread_count(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = ApiResponse<Notification>),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let resp = notification_service::mark_read(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications marked read", body = ApiResponse<usize>)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<usize>>> {
    let resp = notification_service::mark_all_read(&state, &session).await?;
    Ok(Json(resp))
}
