use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};

use crate::{
    dto::storefront::{
        AddToCartRequest, CartView, CheckoutRequest, CheckoutResponse, MoveToCartRequest,
        UpdateCartLineRequest, WishlistToggleRequest, WishlistToggled,
    },
    error::AppResult,
    middleware::auth::ShopperSession,
    models::Product,
    response::ApiResponse,
    services::storefront_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(view_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/cart/{line_id}",
            patch(update_cart_line).delete(remove_cart_line),
        )
        .route("/wishlist", get(list_wishlist).post(toggle_wishlist))
        .route("/wishlist/{product_id}/move", post(move_to_cart))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/shop/cart",
    params(("x-shopper-id" = String, Header, description = "Shopper identifier")),
    responses(
        (status = 200, description = "Cart contents", body = ApiResponse<CartView>)
    ),
    tag = "Storefront"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    shopper: ShopperSession,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = storefront_service::view_cart(&state, &shopper).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/cart",
    params(("x-shopper-id" = String, Header, description = "Shopper identifier")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Product not found")
    ),
    tag = "Storefront"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = storefront_service::add_to_cart(&state, &shopper, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/shop/cart/{line_id}",
    params(
        ("x-shopper-id" = String, Header, description = "Shopper identifier"),
        ("line_id" = String, Path, description = "Cart line ID"),
    ),
    request_body = UpdateCartLineRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartView>),
        (status = 404, description = "Cart line not found")
    ),
    tag = "Storefront"
)]
pub async fn update_cart_line(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Path(line_id): Path<String>,
    Json(payload): Json<UpdateCartLineRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = storefront_service::update_cart_line(&state, &shopper, &line_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/shop/cart/{line_id}",
    params(
        ("x-shopper-id" = String, Header, description = "Shopper identifier"),
        ("line_id" = String, Path, description = "Cart line ID"),
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<CartView>),
        (status = 404, description = "Cart line not found")
    ),
    tag = "Storefront"
)]
pub async fn remove_cart_line(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Path(line_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = storefront_service::remove_cart_line(&state, &shopper, &line_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/shop/cart",
    params(("x-shopper-id" = String, Header, description = "Shopper identifier")),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>)
    ),
    tag = "Storefront"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    shopper: ShopperSession,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = storefront_service::clear_cart(&state, &shopper).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shop/wishlist",
    params(("x-shopper-id" = String, Header, description = "Shopper identifier")),
    responses(
        (status = 200, description = "Wishlisted products", body = ApiResponse<Vec<Product>>)
    ),
    tag = "Storefront"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    shopper: ShopperSession,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = storefront_service::list_wishlist(&state, &shopper).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/wishlist",
    params(("x-shopper-id" = String, Header, description = "Shopper identifier")),
    request_body = WishlistToggleRequest,
    responses(
        (status = 200, description = "Wishlist toggled", body = ApiResponse<WishlistToggled>),
        (status = 404, description = "Product not found")
    ),
    tag = "Storefront"
)]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Json(payload): Json<WishlistToggleRequest>,
) -> AppResult<Json<ApiResponse<WishlistToggled>>> {
    let resp = storefront_service::toggle_wishlist(&state, &shopper, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/wishlist/{product_id}/move",
    params(
        ("x-shopper-id" = String, Header, description = "Shopper identifier"),
        ("product_id" = String, Path, description = "Product ID"),
    ),
    request_body = MoveToCartRequest,
    responses(
        (status = 200, description = "Moved to cart", body = ApiResponse<CartView>),
        (status = 404, description = "Not in wishlist")
    ),
    tag = "Storefront"
)]
pub async fn move_to_cart(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Path(product_id): Path<String>,
    Json(payload): Json<MoveToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = storefront_service::move_to_cart(&state, &shopper, &product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/checkout",
    params(("x-shopper-id" = String, Header, description = "Shopper identifier")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Invalid checkout details or failed verification")
    ),
    tag = "Storefront"
)]
pub async fn checkout(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let resp = storefront_service::checkout(&state, &shopper, payload).await?;
    Ok(Json(resp))
}
