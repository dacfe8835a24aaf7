use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
    pub total_customers: usize,
    pub total_products: usize,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResellerProfit {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_sales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub commission: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub commission_rate: Decimal,
    pub orders_count: usize,
}
