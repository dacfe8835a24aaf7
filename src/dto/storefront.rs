use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CartLine, Customer, DeliveryMethod, Invoice, Order, PaymentMethod};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub size: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartLineRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub item_count: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistToggleRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistToggled {
    /// False when the product was removed.
    pub added: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MoveToCartRequest {
    #[serde(default)]
    pub size: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub barangay: String,
    #[serde(default)]
    pub gender: String,
    pub age: Option<i32>,
    pub alt_contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: CheckoutCustomer,
    pub delivery_method: DeliveryMethod,
    pub delivery_location: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_type: Option<String>,
    pub gov_id_front: String,
    pub gov_id_back: String,
    pub selfie: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub customer: Customer,
    pub pre_invoice: Option<Invoice>,
}
