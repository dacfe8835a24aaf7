//! Bidirectional translation between the local entity shape (camelCase JSON,
//! nested objects addressed with dotted paths) and remote table rows.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Timestamp,
    Date,
    Json,
}

/// Value used when a column is absent, null, or fails to convert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    Null,
    Text(&'static str),
    Zero,
    False,
    EmptyList,
    Now,
}

impl Fallback {
    fn value(self) -> Value {
        match self {
            Fallback::Null => Value::Null,
            Fallback::Text(s) => Value::String(s.to_string()),
            Fallback::Zero => Value::from(0),
            Fallback::False => Value::Bool(false),
            Fallback::EmptyList => Value::Array(Vec::new()),
            Fallback::Now => Value::String(Utc::now().to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Dotted path into the local JSON shape, e.g. `customer.name`.
    pub field: &'static str,
    /// Remote column name.
    pub name: &'static str,
    /// Older column names still accepted when reading.
    pub aliases: &'static [&'static str],
    pub kind: ColumnKind,
    pub fallback: Fallback,
}

pub const fn col(field: &'static str, name: &'static str, kind: ColumnKind) -> Column {
    Column {
        field,
        name,
        aliases: &[],
        kind,
        fallback: Fallback::Null,
    }
}

impl Column {
    pub const fn alias(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn or(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }
}

#[derive(Debug)]
pub struct ColumnMap {
    pub table: &'static str,
    pub key: &'static str,
    pub order_by: &'static str,
    pub descending: bool,
    pub columns: &'static [Column],
}

impl ColumnMap {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks that fields and column names are unique and that the key and
    /// ordering columns exist.
    pub fn validate(&self) -> Result<(), String> {
        let mut fields = HashSet::new();
        let mut names = HashSet::new();
        for column in self.columns {
            if column.field.is_empty() || column.name.is_empty() {
                return Err(format!("{}: empty field or column name", self.table));
            }
            if !fields.insert(column.field) {
                return Err(format!("{}: field '{}' mapped twice", self.table, column.field));
            }
            for name in std::iter::once(&column.name).chain(column.aliases) {
                if !names.insert(*name) {
                    return Err(format!("{}: column '{}' mapped twice", self.table, name));
                }
            }
        }
        if self.column(self.key).is_none() {
            return Err(format!("{}: key column '{}' is not mapped", self.table, self.key));
        }
        if self.column(self.order_by).is_none() {
            return Err(format!(
                "{}: ordering column '{}' is not mapped",
                self.table, self.order_by
            ));
        }
        Ok(())
    }

    /// Local entity JSON to a remote row. Unmapped entity fields are dropped.
    pub fn to_row(&self, entity: &Value) -> Row {
        let mut row = Row::new();
        for column in self.columns {
            let value = get_path(entity, column.field).cloned().unwrap_or(Value::Null);
            row.insert(column.name.to_string(), value);
        }
        row
    }

    /// Remote row to local entity JSON. Missing or unconvertible columns fall
    /// back to the column default and are logged, never rejected.
    pub fn from_row(&self, row: &Row) -> Value {
        let mut entity = Value::Object(Map::new());
        for column in self.columns {
            let raw = std::iter::once(&column.name)
                .chain(column.aliases)
                .filter_map(|name| row.get(*name))
                .find(|v| !v.is_null());
            let value = match raw {
                Some(raw) => coerce(column.kind, raw).unwrap_or_else(|| {
                    tracing::warn!(
                        table = self.table,
                        column = column.name,
                        value = %raw,
                        "column value could not be translated, using default"
                    );
                    column.fallback.value()
                }),
                None => column.fallback.value(),
            };
            set_path(&mut entity, column.field, value);
        }
        entity
    }
}

/// Normalizes a remote JSON value to the shape the local entity expects.
pub fn coerce(kind: ColumnKind, raw: &Value) -> Option<Value> {
    match (kind, raw) {
        (_, Value::Null) => Some(Value::Null),
        (ColumnKind::Text, Value::String(_)) => Some(raw.clone()),
        (ColumnKind::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ColumnKind::Text, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (ColumnKind::Integer, Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Value::from),
        (ColumnKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ColumnKind::Decimal, Value::Number(_)) => Some(raw.clone()),
        (ColumnKind::Decimal, Value::String(s)) => Decimal::from_str(s.trim())
            .ok()
            .and_then(|d| d.to_f64())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        (ColumnKind::Boolean, Value::Bool(_)) => Some(raw.clone()),
        (ColumnKind::Boolean, Value::Number(n)) => n.as_i64().map(|i| Value::Bool(i != 0)),
        (ColumnKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Some(Value::Bool(true)),
            "false" | "f" | "0" | "" => Some(Value::Bool(false)),
            _ => None,
        },
        (ColumnKind::Timestamp | ColumnKind::Date, Value::String(_)) => Some(raw.clone()),
        (ColumnKind::Json, Value::String(s)) => serde_json::from_str(s).ok(),
        (ColumnKind::Json, Value::Array(_) | Value::Object(_)) => Some(raw.clone()),
        _ => None,
    }
}

pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

pub fn set_path(value: &mut Value, path: &str, new_value: Value) {
    let mut current = value;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), new_value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

use ColumnKind::{Boolean, Date, Integer, Json, Text, Timestamp};

pub static PRODUCTS: ColumnMap = ColumnMap {
    table: "products",
    key: "id",
    order_by: "id",
    descending: false,
    columns: &[
        col("id", "id", Text),
        col("name", "name", Text).or(Fallback::Text("")),
        col("price", "price", ColumnKind::Decimal).or(Fallback::Zero),
        col("description", "description", Text).or(Fallback::Text("")),
        col("category", "category", Text).or(Fallback::Text("")),
        col("stock", "stock", Integer).or(Fallback::Zero),
        col("image", "image", Text),
    ],
};

pub static CUSTOMERS: ColumnMap = ColumnMap {
    table: "customers",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("name", "name", Text).or(Fallback::Text("")),
        col("email", "email", Text).or(Fallback::Text("")),
        col("phone", "phone", Text).or(Fallback::Text("")),
        col("address", "address", Text).or(Fallback::Text("")),
        col("barangay", "barangay", Text).or(Fallback::Text("")),
        col("gender", "gender", Text).or(Fallback::Text("")),
        col("age", "age", Integer),
        col("govId", "gov_id_url", Text).alias(&["govId"]),
        col("selfieVerification", "selfie_url", Text).alias(&["selfieVerification"]),
        col("verificationStatus", "verification_status", Text)
            .alias(&["verificationStatus"])
            .or(Fallback::Text("unverified")),
        col("createdAt", "created_at", Timestamp),
    ],
};

pub static MEMBERS: ColumnMap = ColumnMap {
    table: "members",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("username", "username", Text).or(Fallback::Text("")),
        col("passwordHash", "password_hash", Text)
            .alias(&["password"])
            .or(Fallback::Text("")),
        col("role", "role", Text).or(Fallback::Text("reseller")),
        col("status", "status", Text).or(Fallback::Text("active")),
        col("createdDate", "created_at", Timestamp)
            .alias(&["createdDate"])
            .or(Fallback::Now),
        col("lastLogin", "last_login", Timestamp).alias(&["lastLogin"]),
    ],
};

pub static ORDERS: ColumnMap = ColumnMap {
    table: "orders",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("orderNumber", "order_number", Text).or(Fallback::Text("")),
        col("customer.name", "customer_name", Text).or(Fallback::Text("")),
        col("customer.email", "customer_email", Text).or(Fallback::Text("")),
        col("customer.phone", "customer_phone", Text).or(Fallback::Text("")),
        col("customer.address", "customer_address", Text).or(Fallback::Text("")),
        col("customer.barangay", "customer_barangay", Text).or(Fallback::Text("")),
        col("customer.gender", "customer_gender", Text).or(Fallback::Text("")),
        col("customer.age", "customer_age", Integer),
        col("customer.altContact", "customer_alt_contact", Text),
        col("customer.notes", "customer_notes", Text).or(Fallback::Text("None")),
        col("items", "items", Json).or(Fallback::EmptyList),
        col("delivery.method", "delivery_method", Text).or(Fallback::Text("delivery")),
        col("delivery.location", "delivery_location", Text),
        col("delivery.fee", "delivery_fee", ColumnKind::Decimal).or(Fallback::Zero),
        col("delivery.estimatedDate", "delivery_estimated_date", Text).or(Fallback::Text("")),
        col("payment.method", "payment_method", Text).or(Fallback::Text("online")),
        col("payment.paymentType", "payment_type", Text),
        col("total", "total", ColumnKind::Decimal).or(Fallback::Zero),
        col("status", "status", Text).or(Fallback::Text("pending")),
        col("hasPreInvoice", "has_pre_invoice", Boolean).or(Fallback::False),
        col("hasRealInvoice", "has_real_invoice", Boolean).or(Fallback::False),
        col("preInvoiceId", "pre_invoice_id", Text),
        col("realInvoiceId", "real_invoice_id", Text),
        col("requestedBy", "requested_by", Text),
        col("assignedTo", "assigned_to", Text),
        col("createdAt", "created_at", Timestamp).or(Fallback::Now),
    ],
};

pub static INVOICES: ColumnMap = ColumnMap {
    table: "invoices",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("orderId", "order_id", Text).or(Fallback::Text("")),
        col("type", "type", Text).or(Fallback::Text("real")),
        col("customerName", "customer_name", Text).or(Fallback::Text("")),
        col("customerEmail", "customer_email", Text).or(Fallback::Text("")),
        col("customerPhone", "customer_phone", Text).or(Fallback::Text("")),
        col("customerAddress", "customer_address", Text).or(Fallback::Text("")),
        col("items", "items", Json).or(Fallback::EmptyList),
        col("amount", "amount", ColumnKind::Decimal).or(Fallback::Zero),
        col("status", "status", Text).or(Fallback::Text("generated")),
        col("createdAt", "created_at", Timestamp)
            .alias(&["dateCreated"])
            .or(Fallback::Now),
        col("createdBy", "created_by", Text),
    ],
};

pub static STOCK_REQUESTS: ColumnMap = ColumnMap {
    table: "stock_requests",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("productId", "product_id", Text).or(Fallback::Text("")),
        col("productName", "product_name", Text).or(Fallback::Text("")),
        col("quantity", "quantity", Integer)
            .alias(&["quantity_needed"])
            .or(Fallback::Zero),
        col("reason", "reason", Text).or(Fallback::Text("")),
        col("requestedBy", "requested_by", Text)
            .alias(&["reseller_name"])
            .or(Fallback::Text("")),
        col("status", "status", Text).or(Fallback::Text("pending")),
        col("rejectionReason", "rejection_reason", Text),
        col("createdAt", "created_at", Timestamp).or(Fallback::Now),
    ],
};

pub static REPORT_REQUESTS: ColumnMap = ColumnMap {
    table: "report_requests",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("resellerId", "reseller_id", Text).or(Fallback::Text("")),
        col("resellerName", "reseller_name", Text).or(Fallback::Text("")),
        col("reportType", "report_type", Text).or(Fallback::Text("sales")),
        col("dateFrom", "date_from", Date),
        col("dateTo", "date_to", Date),
        col("notes", "notes", Text).or(Fallback::Text("")),
        col("requestedBy", "requested_by", Text).or(Fallback::Text("")),
        col("status", "status", Text).or(Fallback::Text("pending")),
        col("rejectionReason", "rejection_reason", Text),
        col("createdAt", "created_at", Timestamp).or(Fallback::Now),
    ],
};

pub static REPORTS: ColumnMap = ColumnMap {
    table: "reports",
    key: "id",
    order_by: "created_at",
    descending: true,
    columns: &[
        col("id", "id", Text),
        col("requestId", "request_id", Text).or(Fallback::Text("")),
        col("type", "report_type", Text).or(Fallback::Text("sales")),
        col("dateFrom", "date_from", Date),
        col("dateTo", "date_to", Date),
        col("generatedBy", "generated_by", Text).or(Fallback::Text("")),
        col("generatedAt", "created_at", Timestamp).or(Fallback::Now),
        col("notes", "notes", Text).or(Fallback::Text("")),
        col("totalPickups", "total_pickups", Integer),
        col("totalDropoffs", "total_dropoffs", Integer),
        col("avgDeliveryTime", "avg_delivery_time", Text),
        col("demographicsSummary", "demographics_summary", Text),
        col("totalSalesAmount", "total_sales_amount", ColumnKind::Decimal),
        col("totalOrdersCount", "total_orders_count", Integer),
        col("topSellingProducts", "top_selling_products", Text),
        col("newCustomersCount", "new_customers_count", Integer),
        col("returningCustomersCount", "returning_customers_count", Integer),
        col("customerFeedback", "customer_feedback", Text),
    ],
};

pub static SETTINGS: ColumnMap = ColumnMap {
    table: "settings",
    key: "id",
    order_by: "id",
    descending: false,
    columns: &[
        col("id", "id", Integer),
        col("storeName", "store_name", Text).or(Fallback::Text("")),
        col("storeAddress", "store_address", Text).or(Fallback::Text("")),
        col("storePhone", "store_phone", Text).or(Fallback::Text("")),
        col("storeEmail", "store_email", Text).or(Fallback::Text("")),
        col("deliveryFee", "delivery_fee", ColumnKind::Decimal).or(Fallback::Zero),
        col("resellerCommission", "reseller_commission", ColumnKind::Decimal).or(Fallback::Zero),
        col("autoApproval", "auto_approval", Boolean).or(Fallback::False),
    ],
};

pub fn all() -> [&'static ColumnMap; 9] {
    [
        &PRODUCTS,
        &CUSTOMERS,
        &MEMBERS,
        &ORDERS,
        &INVOICES,
        &STOCK_REQUESTS,
        &REPORT_REQUESTS,
        &REPORTS,
        &SETTINGS,
    ]
}

/// Validates every table mapping; run once when the store is built.
pub fn validate_all() -> Result<(), String> {
    all().iter().try_for_each(|map| map.validate())
}
