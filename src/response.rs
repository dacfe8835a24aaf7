use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub total: Option<i64>,
    pub unread: Option<i64>,
    /// Set when a read was served from the local snapshot because the remote backend failed.
    pub degraded: Option<bool>,
}

impl Meta {
    pub fn empty() -> Self {
        Self {
            total: None,
            unread: None,
            degraded: None,
        }
    }

    pub fn total(total: usize) -> Self {
        Self {
            total: Some(total as i64),
            ..Self::empty()
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(message: impl Into<String>, items: Vec<T>) -> Self {
        let meta = Meta::total(items.len());
        Self::success(message, items, Some(meta))
    }
}
