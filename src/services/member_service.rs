use chrono::Utc;

use crate::{
    dto::members::{CreateMemberRequest, UpdateMemberRequest},
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{MAX_HEAD_ADMINS, Member, MemberStatus, MemberView, Role, new_id},
    response::{ApiResponse, Meta},
    services::auth_service::{MIN_PASSWORD_LEN, hash_password},
    state::AppState,
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Rejects a head_admin assignment when the quota is already used by other members.
pub fn ensure_head_admin_capacity(members: &[Member], editing_id: Option<&str>) -> AppResult<()> {
    let holders = members
        .iter()
        .filter(|m| m.role == Role::HeadAdmin)
        .filter(|m| Some(m.id.as_str()) != editing_id)
        .count();
    if holders >= MAX_HEAD_ADMINS {
        return Err(AppError::validation(format!(
            "Maximum of {MAX_HEAD_ADMINS} head admins allowed"
        )));
    }
    Ok(())
}

fn ensure_unique_username(members: &[Member], username: &str, editing_id: Option<&str>) -> AppResult<()> {
    let taken = members
        .iter()
        .any(|m| m.username == username && Some(m.id.as_str()) != editing_id);
    if taken {
        return Err(AppError::validation("Username already exists"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

pub async fn list_members(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<MemberView>>> {
    ensure_head_admin(session)?;
    let items = state
        .store
        .repo::<Member>()
        .load()
        .await
        .into_iter()
        .map(MemberView::from)
        .collect();
    Ok(ApiResponse::list("Members", items))
}

/// Active resellers, for report-request targeting.
pub async fn list_resellers(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<MemberView>>> {
    ensure_head_admin(session)?;
    let items = state
        .store
        .repo::<Member>()
        .load()
        .await
        .into_iter()
        .filter(|m| m.role == Role::Reseller && m.status == MemberStatus::Active)
        .map(MemberView::from)
        .collect();
    Ok(ApiResponse::list("Resellers", items))
}

pub async fn create_member(
    state: &AppState,
    session: &Session,
    payload: CreateMemberRequest,
) -> AppResult<ApiResponse<MemberView>> {
    ensure_head_admin(session)?;
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::validation("Username is required"));
    }
    validate_password(&payload.password)?;

    let repo = state.store.repo::<Member>();
    let members = repo.load().await;
    ensure_unique_username(&members, &username, None)?;
    if payload.role == Role::HeadAdmin {
        ensure_head_admin_capacity(&members, None)?;
    }

    let member = Member {
        id: new_id(payload.role.as_str()),
        username,
        password_hash: hash_password(&payload.password)?,
        role: payload.role,
        status: payload.status.unwrap_or(MemberStatus::Active),
        created_date: Utc::now(),
        last_login: None,
    };
    let member = repo.create(member).await?;
    tracing::info!(member = %member.username, role = %member.role, by = %session.username, "member created");
    Ok(ApiResponse::success("Member created", member.into(), Some(Meta::empty())))
}

pub async fn update_member(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: UpdateMemberRequest,
) -> AppResult<ApiResponse<MemberView>> {
    ensure_head_admin(session)?;
    let repo = state.store.repo::<Member>();
    let members = repo.load().await;
    let mut member = members
        .iter()
        .find(|m| m.id == id)
        .cloned()
        .ok_or(AppError::NotFound)?;

    if let Some(username) = payload.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        ensure_unique_username(&members, &username, Some(id))?;
        member.username = username;
    }
    if let Some(role) = payload.role {
        if role == Role::HeadAdmin {
            ensure_head_admin_capacity(&members, Some(id))?;
        }
        member.role = role;
    }
    if let Some(status) = payload.status {
        member.status = status;
    }
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        validate_password(&password)?;
        member.password_hash = hash_password(&password)?;
    }

    let member = repo.update(member).await?;
    tracing::info!(member = %member.username, by = %session.username, "member updated");
    Ok(ApiResponse::success("Member updated", member.into(), Some(Meta::empty())))
}

pub async fn delete_member(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_head_admin(session)?;
    if id == session.member_id {
        return Err(AppError::precondition("You cannot delete your own account"));
    }
    state.store.repo::<Member>().delete(id).await?;
    tracing::info!(member_id = %id, by = %session.username, "member deleted");
    Ok(ApiResponse::success(
        "Member deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Creates the default head admin when no members exist.
pub async fn provision_default_admin(state: &AppState) -> AppResult<Option<MemberView>> {
    let repo = state.store.repo::<Member>();
    if !repo.load().await.is_empty() {
        return Ok(None);
    }
    let member = Member {
        id: new_id(Role::HeadAdmin.as_str()),
        username: DEFAULT_ADMIN_USERNAME.to_string(),
        password_hash: hash_password(DEFAULT_ADMIN_PASSWORD)?,
        role: Role::HeadAdmin,
        status: MemberStatus::Active,
        created_date: Utc::now(),
        last_login: None,
    };
    let member = repo.create(member).await?;
    tracing::warn!(member = %member.username, "provisioned default head admin, change its password");
    Ok(Some(member.into()))
}
