use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{MemberStatus, Role};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub status: Option<MemberStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    pub username: Option<String>,
    /// Left unchanged when absent or blank.
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<MemberStatus>,
}
