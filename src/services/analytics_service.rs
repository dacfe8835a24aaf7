use rust_decimal::Decimal;

use crate::{
    dto::analytics::{DashboardStats, ResellerProfit, StatusCount},
    error::AppResult,
    middleware::auth::{Session, ensure_head_admin, ensure_role},
    models::{Customer, Order, OrderStatus, Product, Role},
    response::ApiResponse,
    services::settings_service::load_settings,
    state::AppState,
};

const RECENT_ORDERS: usize = 5;

pub fn dashboard_stats(orders: &[Order], customers: usize, products: usize) -> DashboardStats {
    let total_revenue = orders.iter().map(|o| o.total).sum::<Decimal>();
    let mut recent: Vec<Order> = orders.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_ORDERS);
    DashboardStats {
        total_orders: orders.len(),
        total_revenue,
        total_customers: customers,
        total_products: products,
        recent_orders: recent,
    }
}

pub fn status_breakdown(orders: &[Order]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: orders.iter().filter(|o| o.status == *status).count(),
        })
        .collect()
}

/// Sales attributed to a reseller and the commission owed at `rate` percent.
pub fn reseller_profit(orders: &[Order], member_id: &str, username: &str, rate: Decimal) -> ResellerProfit {
    let mine: Vec<&Order> = orders
        .iter()
        .filter(|o| o.is_handled_by(member_id, username))
        .collect();
    let total_sales = mine.iter().map(|o| o.total).sum::<Decimal>();
    let commission = (total_sales * rate / Decimal::ONE_HUNDRED).round_dp(2);
    ResellerProfit {
        total_sales,
        commission,
        commission_rate: rate,
        orders_count: mine.len(),
    }
}

pub async fn get_dashboard(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_head_admin(session)?;
    let orders = state.store.repo::<Order>().load().await;
    let customers = state.store.repo::<Customer>().load().await.len();
    let products = state.store.repo::<Product>().load().await.len();
    let stats = dashboard_stats(&orders, customers, products);
    Ok(ApiResponse::success("Dashboard", stats, None))
}

pub async fn get_status_breakdown(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<StatusCount>>> {
    ensure_head_admin(session)?;
    let orders = state.store.repo::<Order>().load().await;
    Ok(ApiResponse::list("Order status breakdown", status_breakdown(&orders)))
}

pub async fn get_reseller_profit(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<ResellerProfit>> {
    ensure_role(session, Role::Reseller)?;
    let orders = state.store.repo::<Order>().load().await;
    let settings = load_settings(state).await;
    let profit = reseller_profit(
        &orders,
        &session.member_id,
        &session.username,
        settings.reseller_commission,
    );
    Ok(ApiResponse::success("Reseller profit", profit, None))
}
