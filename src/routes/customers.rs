use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::customers::{CreateCustomerRequest, CustomerHistory, CustomerView, UpdateCustomerRequest},
    error::AppResult,
    middleware::auth::Session,
    response::ApiResponse,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/{id}/orders", get(customer_history))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "List customers with derived verification", body = ApiResponse<Vec<CustomerView>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    _session: Session,
) -> AppResult<Json<ApiResponse<Vec<CustomerView>>>> {
    let resp = customer_service::list_customers(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Get customer", body = ApiResponse<CustomerView>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<CustomerView>>> {
    let resp = customer_service::get_customer(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Customer created", body = ApiResponse<CustomerView>),
        (status = 400, description = "Invalid customer or duplicate email")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<Json<ApiResponse<CustomerView>>> {
    let resp = customer_service::create_customer(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = String, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<CustomerView>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<CustomerView>>> {
    let resp = customer_service::update_customer(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = customer_service::delete_customer(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/orders",
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer order history", body = ApiResponse<CustomerHistory>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn customer_history(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<CustomerHistory>>> {
    let resp = customer_service::customer_history(&state, &id).await?;
    Ok(Json(resp))
}
