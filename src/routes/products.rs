use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};

use crate::{
    dto::products::{
        CreateProductRequest, LowStockQuery, ProductQuery, SetStockRequest, UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::Session,
    models::Product,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", patch(set_stock))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("q" = Option<String>, Query, description = "Search name and description"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<Vec<Product>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &session, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/stock",
    params(("id" = String, Path, description = "Product ID")),
    request_body = SetStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse<Product>),
        (status = 400, description = "Negative stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::set_stock(&state, &session, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    params(("threshold" = Option<i32>, Query, description = "Stock threshold, default 5")),
    responses(
        (status = 200, description = "List low stock products", body = ApiResponse<Vec<Product>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    _session: Session,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::list_low_stock(&state, query).await?;
    Ok(Json(resp))
}
