use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::orders::InvoiceQuery,
    error::AppResult,
    middleware::auth::Session,
    models::Invoice,
    response::ApiResponse,
    services::invoice_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices))
        .route("/{id}", get(get_invoice))
        .route("/{id}/verify", post(verify_invoice))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(
        ("type" = Option<String>, Query, description = "`pre` or `real`"),
        ("order_id" = Option<String>, Query, description = "Invoices of one order"),
    ),
    responses(
        (status = 200, description = "List invoices", body = ApiResponse<Vec<Invoice>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    _session: Session,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<ApiResponse<Vec<Invoice>>>> {
    let resp = invoice_service::list_invoices(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Get invoice", body = ApiResponse<Invoice>),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let resp = invoice_service::get_invoice(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/invoices/{id}/verify",
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Pre-invoice verified", body = ApiResponse<Invoice>),
        (status = 409, description = "Invoice cannot be verified")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn verify_invoice(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let resp = invoice_service::verify_invoice(&state, &session, &id).await?;
    Ok(Json(resp))
}
