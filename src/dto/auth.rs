use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{MemberView, Role};

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub member: MemberView,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    /// Member id.
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}
