use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Customer, Order, VerificationStatus};

/// A customer together with its derived verification classification.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    pub verification: VerificationStatus,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        let verification = customer.verification();
        Self {
            customer,
            verification,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub barangay: String,
    #[serde(default)]
    pub gender: String,
    pub age: Option<i32>,
    pub gov_id: Option<String>,
    pub selfie_verification: Option<String>,
    pub verification_status: Option<VerificationStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub barangay: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    /// Absent keeps the stored reference.
    pub gov_id: Option<String>,
    /// Absent keeps the stored reference.
    pub selfie_verification: Option<String>,
    pub verification_status: Option<VerificationStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerHistory {
    pub customer: CustomerView,
    pub orders: Vec<Order>,
}
