use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{ReportPayload, ReportType};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockRequest {
    pub product_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

impl RejectRequest {
    /// The trimmed reason; blank counts as none.
    pub fn reason(&self) -> Option<String> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub reseller_id: String,
    pub report_type: ReportType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateReportRequest {
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub payload: ReportPayload,
}
