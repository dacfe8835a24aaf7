use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::analytics::{DashboardStats, ResellerProfit, StatusCount},
    error::AppResult,
    middleware::auth::Session,
    response::ApiResponse,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/status", get(status_breakdown))
        .route("/profit", get(reseller_profit))
}

#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses(
        (status = 200, description = "Dashboard totals", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = analytics_service::get_dashboard(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/status",
    responses(
        (status = 200, description = "Order count per status", body = ApiResponse<Vec<StatusCount>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn status_breakdown(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<StatusCount>>>> {
    let resp = analytics_service::get_status_breakdown(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/profit",
    responses(
        (status = 200, description = "Sales and commission of the calling reseller", body = ApiResponse<ResellerProfit>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn reseller_profit(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<ResellerProfit>>> {
    let resp = analytics_service::get_reseller_profit(&state, &session).await?;
    Ok(Json(resp))
}
