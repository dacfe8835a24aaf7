use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::{Notification, Role, new_id},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy)]
pub enum Audience<'a> {
    Role(Role),
    /// Member id or username.
    User(&'a str),
}

pub async fn notify(
    state: &AppState,
    audience: Audience<'_>,
    title: &str,
    message: impl Into<String>,
) -> AppResult<Notification> {
    let (target_role, specific_user) = match audience {
        Audience::Role(role) => (Some(role), None),
        Audience::User(user) => (None, Some(user.to_string())),
    };
    let notification = Notification {
        id: new_id("NOTIF"),
        title: title.to_string(),
        message: message.into(),
        target_role,
        specific_user,
        created_at: Utc::now(),
        read: false,
    };
    tracing::debug!(title = %notification.title, ?audience, "notification issued");
    state.store.repo::<Notification>().create(notification).await
}

async fn visible_to(state: &AppState, session: &Session) -> Vec<Notification> {
    let mut items: Vec<Notification> = state
        .store
        .repo::<Notification>()
        .load()
        .await
        .into_iter()
        .filter(|n| n.is_visible_to(session.role, &session.member_id, &session.username))
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

pub async fn list_notifications(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<Notification>>> {
    let items = visible_to(state, session).await;
    let unread = items.iter().filter(|n| !n.read).count();
    let meta = Meta {
        unread: Some(unread as i64),
        ..Meta::total(items.len())
    };
    Ok(ApiResponse::success("Notifications", items, Some(meta)))
}

pub async fn unread_count(state: &AppState, session: &Session) -> AppResult<ApiResponse<usize>> {
    let unread = visible_to(state, session)
        .await
        .iter()
        .filter(|n| !n.read)
        .count();
    Ok(ApiResponse::success("Unread notifications", unread, None))
}

pub async fn mark_read(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<Notification>> {
    let repo = state.store.repo::<Notification>();
    let mut notification = repo.find(id).await?;
    if !notification.is_visible_to(session.role, &session.member_id, &session.username) {
        return Err(AppError::NotFound);
    }
    if !notification.read {
        notification.read = true;
        notification = repo.update(notification).await?;
    }
    Ok(ApiResponse::success("Notification read", notification, Some(Meta::empty())))
}

/// Marks every notification visible to the session as read. Read flags never revert.
pub async fn mark_all_read(state: &AppState, session: &Session) -> AppResult<ApiResponse<usize>> {
    let changed = state
        .store
        .repo::<Notification>()
        .modify(|items| {
            let mut changed: usize = 0;
            for notification in items
                .iter_mut()
                .filter(|n| n.is_visible_to(session.role, &session.member_id, &session.username))
                .filter(|n| !n.read)
            {
                notification.read = true;
                changed += 1;
            }
            Ok(changed)
        })
        .await?;
    Ok(ApiResponse::success("Notifications marked read", changed, Some(Meta::empty())))
}
