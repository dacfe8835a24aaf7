use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{ChangePasswordRequest, LoginRequest, LoginResponse},
    error::AppResult,
    middleware::auth::Session,
    models::MemberView,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/password", post(change_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login member", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or inactive account")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Signed-in member", body = ApiResponse<MemberView>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = auth_service::current_member(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<MemberView>),
        (status = 400, description = "Wrong current password or new password too short")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = auth_service::change_password(&state, &session, payload).await?;
    Ok(Json(resp))
}
