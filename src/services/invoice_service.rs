use chrono::Utc;

use crate::{
    dto::orders::InvoiceQuery,
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{DeliveryMethod, Invoice, InvoiceStatus, InvoiceType, Order, OrderStatus, new_id},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Checks whether `kind` may be issued for the order in its current state.
pub fn ensure_can_issue(order: &Order, kind: InvoiceType) -> AppResult<()> {
    match kind {
        InvoiceType::Pre => {
            if order.delivery.method != DeliveryMethod::Pickup {
                return Err(AppError::precondition(
                    "Pre-invoices are only issued for pickup orders",
                ));
            }
            if order.has_pre_invoice {
                return Err(AppError::precondition(
                    "Pre-invoice already generated for this order",
                ));
            }
        }
        InvoiceType::Real => {
            if order.has_real_invoice {
                return Err(AppError::precondition(
                    "Invoice already generated for this order",
                ));
            }
            if order.status != OrderStatus::Completed {
                return Err(AppError::precondition(
                    "Invoices can only be generated for completed orders",
                ));
            }
        }
    }
    Ok(())
}

fn build_invoice(order: &Order, kind: InvoiceType, created_by: &str) -> Invoice {
    let prefix = match kind {
        InvoiceType::Pre => "PRE",
        InvoiceType::Real => "REAL",
    };
    Invoice {
        id: new_id(prefix),
        order_id: order.id.clone(),
        invoice_type: kind,
        customer_name: order.customer.name.clone(),
        customer_email: order.customer.email.clone(),
        customer_phone: order.customer.phone.clone(),
        customer_address: order.customer.address.clone(),
        items: order.items.clone(),
        amount: order.total,
        status: InvoiceStatus::Generated,
        created_at: Utc::now(),
        created_by: Some(created_by.to_string()),
    }
}

/// Issues an invoice and flags the order. The invoice is written first; if the
/// order write then fails the invoice stays committed and the error is returned.
pub async fn issue_invoice(
    state: &AppState,
    mut order: Order,
    kind: InvoiceType,
    created_by: &str,
) -> AppResult<(Order, Invoice)> {
    ensure_can_issue(&order, kind)?;

    let invoice = state
        .store
        .repo::<Invoice>()
        .create(build_invoice(&order, kind, created_by))
        .await?;

    match kind {
        InvoiceType::Pre => {
            order.has_pre_invoice = true;
            order.pre_invoice_id = Some(invoice.id.clone());
        }
        InvoiceType::Real => {
            order.has_real_invoice = true;
            order.real_invoice_id = Some(invoice.id.clone());
        }
    }
    let order = match state.store.repo::<Order>().update(order).await {
        Ok(order) => order,
        Err(err) => {
            tracing::error!(
                invoice_id = %invoice.id,
                error = %err,
                "invoice stored but order flag update failed"
            );
            return Err(err);
        }
    };

    tracing::info!(
        order_id = %order.id,
        invoice_id = %invoice.id,
        kind = %kind,
        by = %created_by,
        "invoice issued"
    );
    Ok((order, invoice))
}

pub async fn list_invoices(
    state: &AppState,
    query: InvoiceQuery,
) -> AppResult<ApiResponse<Vec<Invoice>>> {
    let kind = query
        .invoice_type
        .as_deref()
        .filter(|t| !t.trim().is_empty() && !t.eq_ignore_ascii_case("all"))
        .map(str::parse::<InvoiceType>)
        .transpose()?;

    let snapshot = state.store.repo::<Invoice>().load_snapshot().await;
    let mut items: Vec<Invoice> = snapshot
        .items
        .into_iter()
        .filter(|i| kind.is_none_or(|k| i.invoice_type == k))
        .filter(|i| query.order_id.as_deref().is_none_or(|o| i.order_id == o))
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let meta = Meta {
        degraded: snapshot.degraded.then_some(true),
        ..Meta::total(items.len())
    };
    Ok(ApiResponse::success("Invoices", items, Some(meta)))
}

pub async fn get_invoice(state: &AppState, id: &str) -> AppResult<ApiResponse<Invoice>> {
    let invoice = state.store.repo::<Invoice>().find(id).await?;
    Ok(ApiResponse::success("Invoice", invoice, None))
}

/// Marks a generated pre-invoice as verified.
pub async fn verify_invoice(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<Invoice>> {
    ensure_head_admin(session)?;
    let repo = state.store.repo::<Invoice>();
    let mut invoice = repo.find(id).await?;
    if invoice.invoice_type != InvoiceType::Pre {
        return Err(AppError::precondition("Only pre-invoices can be verified"));
    }
    if invoice.status != InvoiceStatus::Generated {
        return Err(AppError::precondition("Invoice is already verified"));
    }
    invoice.status = InvoiceStatus::Verified;
    let invoice = repo.update(invoice).await?;
    tracing::info!(invoice_id = %invoice.id, by = %session.username, "pre-invoice verified");
    Ok(ApiResponse::success("Invoice verified", invoice, Some(Meta::empty())))
}
