use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod auth;
pub mod customers;
pub mod doc;
pub mod health;
pub mod invoices;
pub mod members;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod requests;
pub mod settings;
pub mod storefront;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/members", members::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        .nest("/stock-requests", requests::stock_router())
        .nest("/report-requests", requests::report_router())
        .nest("/reports", requests::reports_router())
        .nest("/notifications", notifications::router())
        .nest("/settings", settings::router())
        .nest("/analytics", analytics::router())
        .nest("/shop", storefront::router())
}
