use chrono::Utc;

use crate::{
    dto::requests::{CreateStockRequest, RejectRequest},
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{Product, RequestStatus, Role, StockRequest, new_id},
    response::{ApiResponse, Meta},
    services::{
        notification_service::{Audience, notify},
        product_service::adjust_stock,
    },
    state::AppState,
};

fn ensure_pending(request: &StockRequest) -> AppResult<()> {
    if request.status != RequestStatus::Pending {
        return Err(AppError::precondition(format!(
            "Request has already been {}",
            request.status
        )));
    }
    Ok(())
}

pub(crate) fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(": {r}")).unwrap_or_default()
}

pub async fn create_stock_request(
    state: &AppState,
    session: &Session,
    payload: CreateStockRequest,
) -> AppResult<ApiResponse<StockRequest>> {
    if payload.quantity <= 0 {
        return Err(AppError::validation("Quantity must be greater than zero"));
    }
    let product = state.store.repo::<Product>().find(&payload.product_id).await?;

    let request = StockRequest {
        id: new_id("SR"),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity: payload.quantity,
        reason: payload.reason.trim().to_string(),
        requested_by: session.username.clone(),
        status: RequestStatus::Pending,
        rejection_reason: None,
        created_at: Utc::now(),
    };
    let request = state.store.repo::<StockRequest>().create(request).await?;
    tracing::info!(request_id = %request.id, product_id = %request.product_id, by = %session.username, "stock request created");

    if let Err(err) = notify(
        state,
        Audience::Role(Role::HeadAdmin),
        "New Stock Request",
        format!(
            "{} requested {} units of {}",
            session.username, request.quantity, request.product_name
        ),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    Ok(ApiResponse::success("Stock request submitted", request, Some(Meta::empty())))
}

/// Head admins see every request; resellers see their own.
pub async fn list_stock_requests(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<StockRequest>>> {
    let mut items: Vec<StockRequest> = state
        .store
        .repo::<StockRequest>()
        .load()
        .await
        .into_iter()
        .filter(|r| session.is_head_admin() || r.requested_by == session.username)
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ApiResponse::list("Stock requests", items))
}

/// Approves a pending request and adds its quantity to the product stock.
/// The request is marked first; a failed stock write is reported, not rolled back.
pub async fn approve_stock_request(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<StockRequest>> {
    ensure_head_admin(session)?;
    let repo = state.store.repo::<StockRequest>();
    let mut request = repo.find(id).await?;
    ensure_pending(&request)?;
    state.store.repo::<Product>().find(&request.product_id).await?;

    request.status = RequestStatus::Approved;
    let request = repo.update(request).await?;
    let product = adjust_stock(state, &request.product_id, request.quantity).await?;
    tracing::info!(
        request_id = %request.id,
        product_id = %product.id,
        stock = product.stock,
        by = %session.username,
        "stock request approved"
    );

    if let Err(err) = notify(
        state,
        Audience::User(&request.requested_by),
        "Stock Request Approved",
        format!(
            "Your request for {} units of {} has been approved",
            request.quantity, request.product_name
        ),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    Ok(ApiResponse::success("Stock request approved", request, Some(Meta::empty())))
}

pub async fn reject_stock_request(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: RejectRequest,
) -> AppResult<ApiResponse<StockRequest>> {
    ensure_head_admin(session)?;
    let reason = payload.reason();
    let repo = state.store.repo::<StockRequest>();
    let mut request = repo.find(id).await?;
    ensure_pending(&request)?;

    request.status = RequestStatus::Rejected;
    request.rejection_reason = reason;
    let request = repo.update(request).await?;
    tracing::info!(request_id = %request.id, by = %session.username, "stock request rejected");

    if let Err(err) = notify(
        state,
        Audience::User(&request.requested_by),
        "Stock Request Rejected",
        format!(
            "Your request for {} units of {} was rejected{}",
            request.quantity,
            request.product_name,
            reason_suffix(request.rejection_reason.as_deref())
        ),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    Ok(ApiResponse::success("Stock request rejected", request, Some(Meta::empty())))
}

/// Removes a pending request. Only its requester may cancel it.
pub async fn cancel_stock_request(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let repo = state.store.repo::<StockRequest>();
    let request = repo.find(id).await?;
    if request.requested_by != session.username {
        return Err(AppError::Forbidden);
    }
    ensure_pending(&request)?;
    repo.delete(id).await?;
    tracing::info!(request_id = %id, by = %session.username, "stock request cancelled");
    Ok(ApiResponse::success(
        "Request cancelled",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
