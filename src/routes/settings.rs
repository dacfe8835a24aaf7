use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::settings::UpdateSettingsRequest,
    error::AppResult,
    middleware::auth::Session,
    models::Settings,
    response::ApiResponse,
    services::settings_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Store settings", body = ApiResponse<Settings>)
    ),
    tag = "Settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Settings>>> {
    let resp = settings_service::get_settings(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<Settings>),
        (status = 400, description = "Invalid fee or commission rate"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateSettingsRequest>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let resp = settings_service::update_settings(&state, &session, payload).await?;
    Ok(Json(resp))
}
