use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Invoice, Order};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub status: Option<String>,
    /// Only orders requested by or assigned to the caller.
    pub mine: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignOrderRequest {
    /// Member id or username; `null` clears the assignment.
    pub assignee: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceIssued {
    pub order: Order,
    pub invoice: Invoice,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    #[serde(rename = "type")]
    pub invoice_type: Option<String>,
    pub order_id: Option<String>,
}
