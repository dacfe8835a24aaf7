use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    dto::auth::{ChangePasswordRequest, Claims, LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::{Member, MemberStatus, MemberView},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn issue_token(state: &AppState, member: &Member) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(state.session_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: member.id.clone(),
        username: member.username.clone(),
        role: member.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let repo = state.store.repo::<Member>();
    let member = repo
        .load()
        .await
        .into_iter()
        .find(|m| m.username == username.trim() && m.status == MemberStatus::Active);

    let mut member = match member {
        Some(m) => m,
        None => return Err(AppError::Unauthorized("Invalid username or password".into())),
    };

    if !verify_password(&password, &member.password_hash) {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    member.last_login = Some(Utc::now());
    let member = match repo.update(member.clone()).await {
        Ok(updated) => updated,
        Err(err) => {
            tracing::warn!(error = %err, member = %member.username, "last login update failed");
            member
        }
    };

    let token = issue_token(state, &member)?;
    tracing::info!(member = %member.username, role = %member.role, "member logged in");

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        member: member.into(),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn current_member(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<MemberView>> {
    let member = state.store.repo::<Member>().find(&session.member_id).await?;
    Ok(ApiResponse::success("Current member", member.into(), None))
}

pub async fn change_password(
    state: &AppState,
    session: &Session,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<MemberView>> {
    let repo = state.store.repo::<Member>();
    let mut member = repo.find(&session.member_id).await?;

    if !verify_password(&payload.current_password, &member.password_hash) {
        return Err(AppError::validation("Current password is incorrect"));
    }
    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    member.password_hash = hash_password(&payload.new_password)?;
    let member = repo.update(member).await?;
    tracing::info!(member = %member.username, "password changed");
    Ok(ApiResponse::success("Password changed", member.into(), Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "not-a-hash"));
    }
}
