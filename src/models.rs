use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Builds a collection-unique identifier such as `ORD_3f2c...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

macro_rules! label_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let labels: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        AppError::validation(format!(
                            "invalid {} '{}', expected one of: {}",
                            stringify!($name),
                            s,
                            labels.join(", ")
                        ))
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HeadAdmin,
    Reseller,
}

label_enum!(Role { HeadAdmin => "head_admin", Reseller => "reseller" });

/// At most this many members may hold the head_admin role.
pub const MAX_HEAD_ADMINS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

label_enum!(MemberStatus { Active => "active", Inactive => "inactive" });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
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
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gov_id: Option<String>,
    #[serde(default)]
    pub selfie_verification: Option<String>,
    /// Stored hint only; see [`Customer::verification`].
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Verified,
    Missing,
}

label_enum!(VerificationStatus {
    Unverified => "unverified",
    Verified => "verified",
    Missing => "missing",
});

fn is_present(reference: Option<&str>) -> bool {
    reference.is_some_and(|r| !r.trim().is_empty())
}

/// Classifies a customer from its identity references and stored hint.
pub fn derive_verification(
    gov_id: Option<&str>,
    selfie: Option<&str>,
    stored_hint: Option<&str>,
) -> VerificationStatus {
    if !is_present(gov_id) || !is_present(selfie) {
        return VerificationStatus::Missing;
    }
    match stored_hint {
        Some(hint) if hint.trim().eq_ignore_ascii_case("verified") => VerificationStatus::Verified,
        _ => VerificationStatus::Unverified,
    }
}

impl Customer {
    /// Recomputed on every call; the stored field is never updated from this.
    pub fn verification(&self) -> VerificationStatus {
        derive_verification(
            self.gov_id.as_deref(),
            self.selfie_verification.as_deref(),
            self.verification_status.as_deref(),
        )
    }
}

/// Denormalized copy of the buyer taken when the order is placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
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
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub alt_contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

label_enum!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl OrderStatus {
    const TRANSITIONS: &'static [(OrderStatus, OrderStatus)] = &[
        (OrderStatus::Pending, OrderStatus::Processing),
        (OrderStatus::Processing, OrderStatus::Completed),
        (OrderStatus::Pending, OrderStatus::Cancelled),
        (OrderStatus::Processing, OrderStatus::Cancelled),
    ];

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        Self::TRANSITIONS.contains(&(self, next))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

label_enum!(DeliveryMethod { Pickup => "pickup", Delivery => "delivery" });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub method: DeliveryMethod,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub fee: Decimal,
    #[serde(default)]
    pub estimated_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "cod")]
    Cash,
    #[serde(alias = "gcash")]
    Online,
}

label_enum!(PaymentMethod { Cash => "cash", Online => "online" });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
    #[serde(default)]
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub order_number: String,
    pub customer: CustomerSnapshot,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub status: OrderStatus,
    pub delivery: Delivery,
    pub payment: Payment,
    #[serde(default)]
    pub has_pre_invoice: bool,
    #[serde(default)]
    pub has_real_invoice: bool,
    #[serde(default)]
    pub pre_invoice_id: Option<String>,
    #[serde(default)]
    pub real_invoice_id: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of item subtotals plus the delivery fee.
    pub fn compute_total(items: &[OrderItem], delivery_fee: Decimal) -> Decimal {
        items.iter().map(OrderItem::subtotal).sum::<Decimal>() + delivery_fee
    }

    pub fn is_handled_by(&self, member_id: &str, username: &str) -> bool {
        self.requested_by.as_deref() == Some(username)
            || self
                .assigned_to
                .as_deref()
                .is_some_and(|a| a == member_id || a == username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Pre,
    Real,
}

label_enum!(InvoiceType { Pre => "pre", Real => "real" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Generated,
    Verified,
}

label_enum!(InvoiceStatus { Generated => "generated", Verified => "verified" });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub order_id: String,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub status: MemberStatus,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Member as exposed through the API; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub status: MemberStatus,
    pub created_date: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Member> for MemberView {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            username: member.username,
            role: member.role,
            status: member.status,
            created_date: member.created_date,
            last_login: member.last_login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

label_enum!(RequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i32,
    #[serde(default)]
    pub reason: String,
    pub requested_by: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    PickupDropoff,
    Sales,
    Customer,
}

label_enum!(ReportType {
    PickupDropoff => "pickup_dropoff",
    Sales => "sales",
    Customer => "customer",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub id: String,
    pub reseller_id: String,
    #[serde(default)]
    pub reseller_name: String,
    pub report_type: ReportType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub requested_by: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReportRequest {
    pub fn targets(&self, member_id: &str, username: &str) -> bool {
        self.reseller_id == member_id || self.reseller_name == username
    }
}

/// Free-form figures; which ones are required depends on the report type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    #[serde(default)]
    pub total_pickups: Option<i32>,
    #[serde(default)]
    pub total_dropoffs: Option<i32>,
    #[serde(default)]
    pub avg_delivery_time: Option<String>,
    #[serde(default)]
    pub demographics_summary: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub total_sales_amount: Option<Decimal>,
    #[serde(default)]
    pub total_orders_count: Option<i32>,
    #[serde(default)]
    pub top_selling_products: Option<String>,
    #[serde(default)]
    pub new_customers_count: Option<i32>,
    #[serde(default)]
    pub returning_customers_count: Option<i32>,
    #[serde(default)]
    pub customer_feedback: Option<String>,
}

impl ReportPayload {
    pub fn validate_for(&self, report_type: ReportType) -> Result<(), AppError> {
        let missing: Vec<&str> = match report_type {
            ReportType::PickupDropoff => [
                ("totalPickups", self.total_pickups.is_none()),
                ("totalDropoffs", self.total_dropoffs.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect(),
            ReportType::Sales => [
                ("totalSalesAmount", self.total_sales_amount.is_none()),
                ("totalOrdersCount", self.total_orders_count.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect(),
            ReportType::Customer => [
                ("newCustomersCount", self.new_customers_count.is_none()),
                ("returningCustomersCount", self.returning_customers_count.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect(),
        };
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "{report_type} report requires: {}",
                missing.join(", ")
            )));
        }

        let negative = [
            self.total_pickups,
            self.total_dropoffs,
            self.total_orders_count,
            self.new_customers_count,
            self.returning_customers_count,
        ]
        .into_iter()
        .flatten()
        .any(|count| count < 0);
        if negative || self.total_sales_amount.is_some_and(|a| a.is_sign_negative()) {
            return Err(AppError::validation("report figures cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub request_id: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub payload: ReportPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub target_role: Option<Role>,
    #[serde(default)]
    pub specific_user: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn is_visible_to(&self, role: Role, member_id: &str, username: &str) -> bool {
        self.target_role == Some(role)
            || self
                .specific_user
                .as_deref()
                .is_some_and(|u| u == member_id || u == username)
    }
}

pub const SETTINGS_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "settings_id")]
    pub id: i64,
    pub store_name: String,
    pub store_address: String,
    pub store_phone: String,
    pub store_email: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub delivery_fee: Decimal,
    /// Percentage of sales paid to resellers.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub reseller_commission: Decimal,
    #[serde(default)]
    pub auto_approval: bool,
}

fn settings_id() -> i64 {
    SETTINGS_ID
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID,
            store_name: "Clever Clothing".into(),
            store_address: "Tarlac City, Central Luzon, Philippines".into(),
            store_phone: "+63 123 456 7893".into(),
            store_email: "cleverclothing@gmail.com".into(),
            delivery_fee: Decimal::from(50),
            reseller_commission: Decimal::from(15),
            auto_approval: false,
        }
    }
}

/// One line in a shopper's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub shopper_id: String,
    #[serde(flatten)]
    pub item: OrderItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: String,
    pub shopper_id: String,
    pub product_id: String,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_transitions_follow_the_table() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Completed, Cancelled] {
            for next in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(*next));
            }
        }
    }

    #[test]
    fn status_labels_parse_case_insensitively() {
        assert_eq!("Completed".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
        assert_eq!(" pending ".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert!(matches!(
            "shipped".parse::<OrderStatus>(),
            Err(AppError::Validation(_))
        ));
        assert_eq!("head_admin".parse::<Role>().unwrap(), Role::HeadAdmin);
    }

    #[test]
    fn verification_is_missing_without_both_references() {
        assert_eq!(
            derive_verification(None, Some("selfie.png"), Some("verified")),
            VerificationStatus::Missing
        );
        assert_eq!(
            derive_verification(Some("id.png"), Some("  "), Some("verified")),
            VerificationStatus::Missing
        );
        assert_eq!(
            derive_verification(Some("id.png"), Some("selfie.png"), Some("verified")),
            VerificationStatus::Verified
        );
        assert_eq!(
            derive_verification(Some("id.png"), Some("selfie.png"), Some("pending-review")),
            VerificationStatus::Unverified
        );
        assert_eq!(
            derive_verification(Some("id.png"), Some("selfie.png"), None),
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn verification_is_deterministic() {
        let inputs = [
            (Some("a"), Some("b"), Some("verified")),
            (Some("a"), None, Some("verified")),
            (Some("a"), Some("b"), None),
        ];
        for (gov, selfie, hint) in inputs {
            assert_eq!(
                derive_verification(gov, selfie, hint),
                derive_verification(gov, selfie, hint)
            );
        }
    }

    #[test]
    fn total_adds_delivery_fee_to_item_subtotals() {
        let items = vec![
            OrderItem {
                product_id: "P1".into(),
                name: "Be Clever Enough".into(),
                price: dec!(550),
                quantity: 2,
                size: "L".into(),
                image: None,
            },
            OrderItem {
                product_id: "P2".into(),
                name: "Sie/Te".into(),
                price: dec!(349.99),
                quantity: 1,
                size: "M".into(),
                image: None,
            },
        ];
        assert_eq!(Order::compute_total(&items, dec!(50)), dec!(1499.99));
        assert_eq!(Order::compute_total(&[], dec!(0)), dec!(0));
    }

    #[test]
    fn payment_method_accepts_legacy_labels() {
        let cash: PaymentMethod = serde_json::from_str("\"cod\"").unwrap();
        let online: PaymentMethod = serde_json::from_str("\"gcash\"").unwrap();
        assert_eq!(cash, PaymentMethod::Cash);
        assert_eq!(online, PaymentMethod::Online);
    }

    #[test]
    fn report_payload_requires_type_specific_fields() {
        let payload = ReportPayload {
            total_sales_amount: Some(dec!(1200.50)),
            ..Default::default()
        };
        assert!(payload.validate_for(ReportType::Sales).is_err());

        let payload = ReportPayload {
            total_sales_amount: Some(dec!(1200.50)),
            total_orders_count: Some(4),
            ..Default::default()
        };
        assert!(payload.validate_for(ReportType::Sales).is_ok());
        assert!(payload.validate_for(ReportType::Customer).is_err());
    }
}
