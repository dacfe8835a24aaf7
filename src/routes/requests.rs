use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};

use crate::{
    dto::requests::{CreateReportRequest, CreateStockRequest, GenerateReportRequest, RejectRequest},
    error::AppResult,
    middleware::auth::Session,
    models::{Report, ReportRequest, StockRequest},
    response::ApiResponse,
    services::{report_service, stock_request_service},
    state::AppState,
};

pub fn stock_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock_requests).post(create_stock_request))
        .route("/{id}", delete(cancel_stock_request))
        .route("/{id}/approve", post(approve_stock_request))
        .route("/{id}/reject", post(reject_stock_request))
}

pub fn report_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_report_requests).post(create_report_request))
        .route("/{id}/approve", post(approve_report_request))
        .route("/{id}/reject", post(reject_report_request))
        .route("/{id}/generate", post(generate_report))
}

pub fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports))
        .route("/{id}", get(get_report))
}

#[utoipa::path(
    post,
    path = "/api/stock-requests",
    request_body = CreateStockRequest,
    responses(
        (status = 200, description = "Stock request submitted", body = ApiResponse<StockRequest>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock Requests"
)]
pub async fn create_stock_request(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateStockRequest>,
) -> AppResult<Json<ApiResponse<StockRequest>>> {
    let resp = stock_request_service::create_stock_request(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stock-requests",
    responses(
        (status = 200, description = "Stock requests visible to the caller", body = ApiResponse<Vec<StockRequest>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Stock Requests"
)]
pub async fn list_stock_requests(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<StockRequest>>>> {
    let resp = stock_request_service::list_stock_requests(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/stock-requests/{id}/approve",
    params(("id" = String, Path, description = "Stock request ID")),
    responses(
        (status = 200, description = "Approved and stock added", body = ApiResponse<StockRequest>),
        (status = 409, description = "Request already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock Requests"
)]
pub async fn approve_stock_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<StockRequest>>> {
    let resp = stock_request_service::approve_stock_request(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/stock-requests/{id}/reject",
    params(("id" = String, Path, description = "Stock request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected", body = ApiResponse<StockRequest>),
        (status = 409, description = "Request already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock Requests"
)]
pub async fn reject_stock_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<ApiResponse<StockRequest>>> {
    let resp = stock_request_service::reject_stock_request(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/stock-requests/{id}",
    params(("id" = String, Path, description = "Stock request ID")),
    responses(
        (status = 200, description = "Cancelled"),
        (status = 403, description = "Not the requester"),
        (status = 409, description = "Request already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock Requests"
)]
pub async fn cancel_stock_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = stock_request_service::cancel_stock_request(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/report-requests",
    request_body = CreateReportRequest,
    responses(
        (status = 200, description = "Report requested", body = ApiResponse<ReportRequest>),
        (status = 400, description = "Invalid date range or reseller")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn create_report_request(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<ReportRequest>>> {
    let resp = report_service::create_report_request(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/report-requests",
    responses(
        (status = 200, description = "Report requests visible to the caller", body = ApiResponse<Vec<ReportRequest>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn list_report_requests(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<ReportRequest>>>> {
    let resp = report_service::list_report_requests(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/report-requests/{id}/approve",
    params(("id" = String, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "Approved", body = ApiResponse<ReportRequest>),
        (status = 409, description = "Request already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn approve_report_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ReportRequest>>> {
    let resp = report_service::approve_report_request(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/report-requests/{id}/reject",
    params(("id" = String, Path, description = "Report request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected", body = ApiResponse<ReportRequest>),
        (status = 409, description = "Request already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn reject_report_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<ApiResponse<ReportRequest>>> {
    let resp = report_service::reject_report_request(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/report-requests/{id}/generate",
    params(("id" = String, Path, description = "Report request ID")),
    request_body = GenerateReportRequest,
    responses(
        (status = 200, description = "Report generated", body = ApiResponse<Report>),
        (status = 409, description = "Request not approved")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn generate_report(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<GenerateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let resp = report_service::generate_report(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Generated reports", body = ApiResponse<Vec<Report>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn list_reports(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Vec<Report>>>> {
    let resp = report_service::list_reports(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Get report", body = ApiResponse<Report>),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn get_report(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let resp = report_service::get_report(&state, &session, &id).await?;
    Ok(Json(resp))
}
