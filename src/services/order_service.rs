use crate::{
    dto::orders::{AssignOrderRequest, InvoiceIssued, OrderListQuery, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{InvoiceType, Member, Order, OrderStatus, Role},
    response::{ApiResponse, Meta},
    services::{
        invoice_service::issue_invoice,
        notification_service::{Audience, notify},
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    session: &Session,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty() && !s.eq_ignore_ascii_case("all"))
        .map(str::parse::<OrderStatus>)
        .transpose()?;
    let mine = query.mine.unwrap_or(false);

    let snapshot = state.store.repo::<Order>().load_snapshot().await;
    let mut items: Vec<Order> = snapshot
        .items
        .into_iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .filter(|o| !mine || o.is_handled_by(&session.member_id, &session.username))
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let meta = Meta {
        degraded: snapshot.degraded.then_some(true),
        ..Meta::total(items.len())
    };
    Ok(ApiResponse::success("Orders", items, Some(meta)))
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<ApiResponse<Order>> {
    let order = state.store.repo::<Order>().find(id).await?;
    Ok(ApiResponse::success("Order", order, None))
}

/// Moves an order along the transition table. Reseller-initiated changes are
/// reported to the head admins.
pub async fn update_order_status(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let next: OrderStatus = payload.status.parse()?;
    let repo = state.store.repo::<Order>();
    let mut order = repo.find(id).await?;
    let previous = order.status;

    if !previous.can_transition_to(next) {
        return Err(AppError::precondition(format!(
            "Cannot change order status from {previous} to {next}"
        )));
    }

    order.status = next;
    let order = repo.update(order).await?;
    tracing::info!(
        order_id = %order.id,
        from = %previous,
        to = %next,
        by = %session.username,
        "order status updated"
    );

    if session.role == Role::Reseller {
        let reference = if order.order_number.is_empty() {
            &order.id
        } else {
            &order.order_number
        };
        if let Err(err) = notify(
            state,
            Audience::Role(Role::HeadAdmin),
            "Order Status Updated",
            format!(
                "Reseller {} changed order {} from {} to {}",
                session.username, reference, previous, next
            ),
        )
        .await
        {
            tracing::warn!(error = %err, "notification failed");
        }
    }

    Ok(ApiResponse::success("Order status updated", order, Some(Meta::empty())))
}

pub async fn assign_order(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: AssignOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_head_admin(session)?;
    let assignee = payload
        .assignee
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    if let Some(assignee) = assignee.as_deref() {
        let known = state
            .store
            .repo::<Member>()
            .load()
            .await
            .iter()
            .any(|m| m.role == Role::Reseller && (m.id == assignee || m.username == assignee));
        if !known {
            return Err(AppError::validation("Orders can only be assigned to resellers"));
        }
    }

    let repo = state.store.repo::<Order>();
    let mut order = repo.find(id).await?;
    order.assigned_to = assignee.clone();
    let order = repo.update(order).await?;

    if let Some(assignee) = assignee.as_deref() {
        if let Err(err) = notify(
            state,
            Audience::User(assignee),
            "Order Assigned",
            format!("Order {} has been assigned to you", order.order_number),
        )
        .await
        {
            tracing::warn!(error = %err, "notification failed");
        }
    }
    Ok(ApiResponse::success("Order assigned", order, Some(Meta::empty())))
}

pub async fn generate_pre_invoice(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<InvoiceIssued>> {
    generate_invoice(state, session, id, InvoiceType::Pre).await
}

pub async fn generate_real_invoice(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<InvoiceIssued>> {
    generate_invoice(state, session, id, InvoiceType::Real).await
}

async fn generate_invoice(
    state: &AppState,
    session: &Session,
    id: &str,
    kind: InvoiceType,
) -> AppResult<ApiResponse<InvoiceIssued>> {
    ensure_head_admin(session)?;
    let order = state.store.repo::<Order>().find(id).await?;
    let (order, invoice) = issue_invoice(state, order, kind, &session.username).await?;
    let message = match kind {
        InvoiceType::Pre => "Pre-invoice generated",
        InvoiceType::Real => "Invoice generated",
    };
    Ok(ApiResponse::success(
        message,
        InvoiceIssued { order, invoice },
        Some(Meta::empty()),
    ))
}
