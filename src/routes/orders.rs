use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};

use crate::{
    dto::orders::{AssignOrderRequest, InvoiceIssued, OrderListQuery, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::Session,
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", patch(update_order_status))
        .route("/{id}/assign", patch(assign_order))
        .route("/{id}/pre-invoice", post(generate_pre_invoice))
        .route("/{id}/invoice", post(generate_real_invoice))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("status" = Option<String>, Query, description = "Status label, or `all`"),
        ("mine" = Option<bool>, Query, description = "Only orders handled by the caller"),
    ),
    responses(
        (status = 200, description = "List orders, newest first", body = ApiResponse<Vec<Order>>),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = order_service::list_orders(&state, &session, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get order", body = ApiResponse<Order>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = String, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order_status(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/assign",
    params(("id" = String, Path, description = "Order ID")),
    request_body = AssignOrderRequest,
    responses(
        (status = 200, description = "Order assigned", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn assign_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<AssignOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::assign_order(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/pre-invoice",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Pre-invoice issued", body = ApiResponse<InvoiceIssued>),
        (status = 409, description = "Order not eligible")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn generate_pre_invoice(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<InvoiceIssued>>> {
    let resp = order_service::generate_pre_invoice(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/invoice",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Invoice issued", body = ApiResponse<InvoiceIssued>),
        (status = 409, description = "Order not eligible")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn generate_real_invoice(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<InvoiceIssued>>> {
    let resp = order_service::generate_real_invoice(&state, &session, &id).await?;
    Ok(Json(resp))
}
