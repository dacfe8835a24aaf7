use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::members::{CreateMemberRequest, UpdateMemberRequest},
    error::AppResult,
    middleware::auth::Session,
    models::MemberView,
    response::ApiResponse,
    services::member_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/resellers", get(list_resellers))
        .route("/{id}", put(update_member).delete(delete_member))
}

#[utoipa::path(
    get,
    path = "/api/members",
    responses(
        (status = 200, description = "List members (head admin only)", body = ApiResponse<Vec<MemberView>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn list_members(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<MemberView>>>> {
    let resp = member_service::list_members(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/members/resellers",
    responses(
        (status = 200, description = "Active resellers", body = ApiResponse<Vec<MemberView>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn list_resellers(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<MemberView>>>> {
    let resp = member_service::list_resellers(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/members",
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member created", body = ApiResponse<MemberView>),
        (status = 400, description = "Duplicate username or head admin quota reached"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn create_member(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateMemberRequest>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = member_service::create_member(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/members/{id}",
    params(("id" = String, Path, description = "Member ID")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = ApiResponse<MemberView>),
        (status = 400, description = "Duplicate username or head admin quota reached"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn update_member(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMemberRequest>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = member_service::update_member(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member deleted"),
        (status = 409, description = "Cannot delete own account"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn delete_member(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = member_service::delete_member(&state, &session, &id).await?;
    Ok(Json(resp))
}
