use rust_decimal::Decimal;

use crate::{
    dto::products::{
        CreateProductRequest, LowStockQuery, ProductQuery, SetStockRequest, UpdateProductRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{Product, new_id},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

fn validate_product(name: &str, price: Decimal, stock: i32) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Product name is required"));
    }
    if price.is_sign_negative() {
        return Err(AppError::validation("Price cannot be negative"));
    }
    if stock < 0 {
        return Err(AppError::validation("Stock cannot be negative"));
    }
    Ok(())
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let snapshot = state.store.repo::<Product>().load_snapshot().await;
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let items: Vec<Product> = snapshot
        .items
        .into_iter()
        .filter(|p| {
            query
                .category
                .as_deref()
                .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
        })
        .filter(|p| {
            needle.as_deref().is_none_or(|n| {
                p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
            })
        })
        .collect();

    let meta = Meta {
        degraded: snapshot.degraded.then_some(true),
        ..Meta::total(items.len())
    };
    Ok(ApiResponse::success("Products", items, Some(meta)))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<Product>> {
    let product = state.store.repo::<Product>().find(id).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    session: &Session,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_head_admin(session)?;
    validate_product(&payload.name, payload.price, payload.stock)?;

    let product = Product {
        id: new_id("PROD"),
        name: payload.name.trim().to_string(),
        price: payload.price,
        description: payload.description.unwrap_or_default(),
        category: payload.category.unwrap_or_default(),
        stock: payload.stock,
        image: payload.image,
    };
    let product = state.store.repo::<Product>().create(product).await?;
    tracing::info!(product_id = %product.id, by = %session.username, "product created");
    Ok(ApiResponse::success("Product created", product, Some(Meta::empty())))
}

pub async fn update_product(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_head_admin(session)?;
    let repo = state.store.repo::<Product>();
    let mut product = repo.find(id).await?;

    if let Some(name) = payload.name {
        product.name = name.trim().to_string();
    }
    if let Some(price) = payload.price {
        product.price = price;
    }
    if let Some(description) = payload.description {
        product.description = description;
    }
    if let Some(category) = payload.category {
        product.category = category;
    }
    if let Some(stock) = payload.stock {
        product.stock = stock;
    }
    if payload.image.is_some() {
        product.image = payload.image;
    }
    validate_product(&product.name, product.price, product.stock)?;

    let product = repo.update(product).await?;
    tracing::info!(product_id = %product.id, by = %session.username, "product updated");
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_head_admin(session)?;
    state.store.repo::<Product>().delete(id).await?;
    tracing::info!(product_id = %id, by = %session.username, "product deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Manual stock update. Negative levels are rejected without a write.
pub async fn set_stock(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: SetStockRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_head_admin(session)?;
    if payload.stock < 0 {
        return Err(AppError::validation("Stock cannot be negative"));
    }
    let repo = state.store.repo::<Product>();
    let mut product = repo.find(id).await?;
    let previous = product.stock;
    product.stock = payload.stock;
    let product = repo.update(product).await?;
    tracing::info!(
        product_id = %product.id,
        previous,
        stock = product.stock,
        by = %session.username,
        "stock updated"
    );
    Ok(ApiResponse::success("Stock updated", product, Some(Meta::empty())))
}

/// Adds `delta` units to a product. The result must stay non-negative.
pub async fn adjust_stock(state: &AppState, id: &str, delta: i32) -> AppResult<Product> {
    let repo = state.store.repo::<Product>();
    let mut product = repo.find(id).await?;
    let stock = product
        .stock
        .checked_add(delta)
        .filter(|s| *s >= 0)
        .ok_or_else(|| AppError::validation("Stock cannot be negative"))?;
    product.stock = stock;
    repo.update(product).await
}

pub async fn list_low_stock(
    state: &AppState,
    query: LowStockQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let mut items: Vec<Product> = state
        .store
        .repo::<Product>()
        .load()
        .await
        .into_iter()
        .filter(|p| p.stock <= threshold)
        .collect();
    items.sort_by_key(|p| p.stock);
    Ok(ApiResponse::list("Low stock products", items))
}
