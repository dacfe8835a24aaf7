use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, models::Role, state::AppState};

pub const SHOPPER_HEADER: &str = "x-shopper-id";

/// The signed-in admin member, decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub member_id: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn is_head_admin(&self) -> bool {
        self.role == Role::HeadAdmin
    }
}

pub fn ensure_role(session: &Session, role: Role) -> Result<(), AppError> {
    if session.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_head_admin(session: &Session) -> Result<(), AppError> {
    ensure_role(session, Role::HeadAdmin)
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        };

        let decoded = decode::<Claims>(
            token.trim(),
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        Ok(Session {
            member_id: decoded.claims.sub,
            username: decoded.claims.username,
            role: decoded.claims.role,
        })
    }
}

/// Anonymous storefront visitor owning a cart and wishlist.
#[derive(Debug, Clone)]
pub struct ShopperSession {
    pub shopper_id: String,
}

impl<S> FromRequestParts<S> for ShopperSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let shopper_id = parts
            .headers
            .get(SHOPPER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {SHOPPER_HEADER} header")))?;

        Ok(ShopperSession {
            shopper_id: shopper_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    use crate::{
        config::AppConfig,
        models::{Member, MemberStatus},
        services::auth_service::issue_token,
        store::{Store, local::LocalStore},
    };

    fn state() -> AppState {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            data_dir: "unused".into(),
            remote_database_url: None,
            jwt_secret: "unit-secret".into(),
            session_ttl_hours: 1,
            verification_pass_rate: 1.0,
        };
        AppState::new(Store::new(LocalStore::in_memory()).unwrap(), &config)
    }

    async fn extract(state: &AppState, authorization: Option<&str>) -> Result<Session, AppError> {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Session::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn bearer_token_yields_session() {
        let state = state();
        let member = Member {
            id: "reseller_1".into(),
            username: "rhea".into(),
            password_hash: String::new(),
            role: Role::Reseller,
            status: MemberStatus::Active,
            created_date: Utc::now(),
            last_login: None,
        };
        let token = issue_token(&state, &member).unwrap();

        let session = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(session.member_id, "reseller_1");
        assert_eq!(session.role, Role::Reseller);
        assert!(ensure_head_admin(&session).is_err());

        assert!(matches!(extract(&state, None).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(
            extract(&state, Some(&format!("Token {token}"))).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            extract(&state, Some("Bearer not.a.jwt")).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
