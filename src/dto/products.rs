use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: i32,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStockRequest {
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}
