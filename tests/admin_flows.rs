mod common;

use common::{create_member, create_product, head_admin, place_order, session_for, setup_state};
use rust_decimal_macros::dec;
use storefront_admin_api::{
    dto::{
        members::UpdateMemberRequest,
        orders::{OrderListQuery, UpdateOrderStatusRequest},
        products::{LowStockQuery, SetStockRequest, UpdateProductRequest},
        requests::{CreateReportRequest, CreateStockRequest, GenerateReportRequest, RejectRequest},
    },
    error::AppError,
    models::{
        DeliveryMethod, OrderStatus, Product, ReportPayload, ReportType, RequestStatus, Role,
    },
    services::{
        member_service,
        notification_service::{self, Audience},
        order_service, product_service, report_service, stock_request_service,
    },
};

fn status(label: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: label.into(),
    }
}

// Reseller asks for stock -> head admin approves -> stock grows and the reseller is told.
#[tokio::test]
async fn approved_stock_request_adds_quantity() -> anyhow::Result<()> {
    let state = setup_state()?;
    let reseller = session_for(&create_member(&state, "rhea", Role::Reseller).await?);
    let product = create_product(&state, "Oxford Shirt", dec!(899), 10).await?;

    let request = stock_request_service::create_stock_request(
        &state,
        &reseller,
        CreateStockRequest {
            product_id: product.id.clone(),
            quantity: 5,
            reason: "weekend bazaar".into(),
        },
    )
    .await?
    .data
    .expect("request");
    assert_eq!(request.status, RequestStatus::Pending);

    let approved = stock_request_service::approve_stock_request(&state, &head_admin(), &request.id)
        .await?
        .data
        .expect("approved");
    assert_eq!(approved.status, RequestStatus::Approved);

    let product = state.store.repo::<Product>().find(&product.id).await?;
    assert_eq!(product.stock, 15);

    let again = stock_request_service::approve_stock_request(&state, &head_admin(), &request.id).await;
    assert!(matches!(again, Err(AppError::Precondition(_))));
    let product = state.store.repo::<Product>().find(&product.id).await?;
    assert_eq!(product.stock, 15);

    let inbox = notification_service::list_notifications(&state, &reseller).await?;
    let titles: Vec<String> = inbox.data.expect("inbox").into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Stock Request Approved".to_string()]);

    let admin_inbox = notification_service::list_notifications(&state, &head_admin()).await?;
    assert!(
        admin_inbox
            .data
            .expect("inbox")
            .iter()
            .any(|n| n.title == "New Stock Request")
    );
    Ok(())
}

#[tokio::test]
async fn stock_requests_are_validated_and_scoped() -> anyhow::Result<()> {
    let state = setup_state()?;
    let owner = session_for(&create_member(&state, "owner", Role::Reseller).await?);
    let other = session_for(&create_member(&state, "other", Role::Reseller).await?);
    let product = create_product(&state, "Tote Bag", dec!(499), 3).await?;

    let zero = stock_request_service::create_stock_request(
        &state,
        &owner,
        CreateStockRequest {
            product_id: product.id.clone(),
            quantity: 0,
            reason: String::new(),
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let request = stock_request_service::create_stock_request(
        &state,
        &owner,
        CreateStockRequest {
            product_id: product.id.clone(),
            quantity: 2,
            reason: String::new(),
        },
    )
    .await?
    .data
    .expect("request");

    let visible = stock_request_service::list_stock_requests(&state, &other).await?;
    assert!(visible.data.expect("list").is_empty());

    let cancel = stock_request_service::cancel_stock_request(&state, &other, &request.id).await;
    assert!(matches!(cancel, Err(AppError::Forbidden)));

    stock_request_service::cancel_stock_request(&state, &owner, &request.id).await?;
    let gone = stock_request_service::list_stock_requests(&state, &head_admin()).await?;
    assert!(gone.data.expect("list").is_empty());
    Ok(())
}

// Pickup order: pre-invoice at checkout, a second is refused, the invoice waits for completion.
#[tokio::test]
async fn invoice_lifecycle_follows_order_status() -> anyhow::Result<()> {
    let state = setup_state()?;
    let product = create_product(&state, "Knit Cardigan", dec!(1499), 5).await?;
    let placed = place_order(&state, &product, 1, DeliveryMethod::Pickup).await?;
    let order_id = placed.order.id.clone();
    assert!(placed.order.has_pre_invoice);
    assert!(placed.pre_invoice.is_some());

    let second = order_service::generate_pre_invoice(&state, &head_admin(), &order_id).await;
    match second {
        Err(AppError::Precondition(message)) => {
            assert_eq!(message, "Pre-invoice already generated for this order")
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }

    let early = order_service::generate_real_invoice(&state, &head_admin(), &order_id).await;
    assert!(matches!(early, Err(AppError::Precondition(_))));

    order_service::update_order_status(&state, &head_admin(), &order_id, status("processing")).await?;
    order_service::update_order_status(&state, &head_admin(), &order_id, status("completed")).await?;

    let issued = order_service::generate_real_invoice(&state, &head_admin(), &order_id)
        .await?
        .data
        .expect("invoice");
    assert!(issued.order.has_real_invoice);
    assert_eq!(issued.order.real_invoice_id.as_deref(), Some(issued.invoice.id.as_str()));
    assert_eq!(issued.invoice.amount, placed.order.total);

    let twice = order_service::generate_real_invoice(&state, &head_admin(), &order_id).await;
    assert!(matches!(twice, Err(AppError::Precondition(_))));
    Ok(())
}

#[tokio::test]
async fn terminal_orders_cannot_move_back() -> anyhow::Result<()> {
    let state = setup_state()?;
    let reseller = session_for(&create_member(&state, "ria", Role::Reseller).await?);
    let product = create_product(&state, "Linen Pants", dec!(1249), 4).await?;
    let order_id = place_order(&state, &product, 2, DeliveryMethod::Delivery)
        .await?
        .order
        .id;

    let skip = order_service::update_order_status(&state, &head_admin(), &order_id, status("completed")).await;
    assert!(matches!(skip, Err(AppError::Precondition(_))));

    let unknown = order_service::update_order_status(&state, &head_admin(), &order_id, status("shipped")).await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));

    order_service::update_order_status(&state, &reseller, &order_id, status("processing")).await?;
    order_service::update_order_status(&state, &reseller, &order_id, status("completed")).await?;

    let back = order_service::update_order_status(&state, &head_admin(), &order_id, status("pending")).await;
    match back {
        Err(AppError::Precondition(message)) => {
            assert_eq!(message, "Cannot change order status from completed to pending")
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }

    let completed = order_service::list_orders(
        &state,
        &head_admin(),
        OrderListQuery {
            status: Some("completed".into()),
            mine: None,
        },
    )
    .await?;
    assert_eq!(completed.data.expect("orders").len(), 1);

    let admin_inbox = notification_service::list_notifications(&state, &head_admin()).await?;
    let status_updates = admin_inbox
        .data
        .expect("inbox")
        .into_iter()
        .filter(|n| n.title == "Order Status Updated")
        .count();
    assert_eq!(status_updates, 2);
    Ok(())
}

// Rejection stores the reason, tells the requester, and freezes the request.
#[tokio::test]
async fn rejected_stock_request_is_final() -> anyhow::Result<()> {
    let state = setup_state()?;
    let reseller = session_for(&create_member(&state, "rhea", Role::Reseller).await?);
    let product = create_product(&state, "Wool Scarf", dec!(650), 4).await?;

    let mut ids = Vec::new();
    for quantity in [6, 2] {
        let request = stock_request_service::create_stock_request(
            &state,
            &reseller,
            CreateStockRequest {
                product_id: product.id.clone(),
                quantity,
                reason: "holiday rush".into(),
            },
        )
        .await?
        .data
        .expect("request");
        ids.push(request.id);
    }

    let rejected = stock_request_service::reject_stock_request(
        &state,
        &head_admin(),
        &ids[0],
        RejectRequest {
            reason: Some(" over allocation ".into()),
        },
    )
    .await?
    .data
    .expect("rejected");
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("over allocation"));

    let silent = stock_request_service::reject_stock_request(
        &state,
        &head_admin(),
        &ids[1],
        RejectRequest {
            reason: Some("   ".into()),
        },
    )
    .await?
    .data
    .expect("rejected");
    assert_eq!(silent.rejection_reason, None);

    let approve = stock_request_service::approve_stock_request(&state, &head_admin(), &ids[0]).await;
    assert!(matches!(approve, Err(AppError::Precondition(_))));
    let cancel = stock_request_service::cancel_stock_request(&state, &reseller, &ids[0]).await;
    assert!(matches!(cancel, Err(AppError::Precondition(_))));
    let reject = stock_request_service::reject_stock_request(
        &state,
        &head_admin(),
        &ids[0],
        RejectRequest::default(),
    )
    .await;
    assert!(matches!(reject, Err(AppError::Precondition(_))));
    assert_eq!(state.store.repo::<Product>().find(&product.id).await?.stock, 4);

    let mut messages: Vec<String> = notification_service::list_notifications(&state, &reseller)
        .await?
        .data
        .expect("inbox")
        .into_iter()
        .filter(|n| n.title == "Stock Request Rejected")
        .map(|n| n.message)
        .collect();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "Your request for 2 units of Wool Scarf was rejected".to_string(),
            "Your request for 6 units of Wool Scarf was rejected: over allocation".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn pre_invoice_is_refused_for_delivery_orders() -> anyhow::Result<()> {
    let state = setup_state()?;
    let product = create_product(&state, "Chino Shorts", dec!(799), 6).await?;
    let placed = place_order(&state, &product, 1, DeliveryMethod::Delivery).await?;
    assert!(!placed.order.has_pre_invoice);
    assert!(placed.pre_invoice.is_none());

    let refused = order_service::generate_pre_invoice(&state, &head_admin(), &placed.order.id).await;
    match refused {
        Err(AppError::Precondition(message)) => {
            assert_eq!(message, "Pre-invoices are only issued for pickup orders")
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }

    let order = order_service::get_order(&state, &placed.order.id)
        .await?
        .data
        .expect("order");
    assert!(!order.has_pre_invoice);
    assert_eq!(order.pre_invoice_id, None);
    Ok(())
}

#[tokio::test]
async fn orders_cancel_before_completion_only() -> anyhow::Result<()> {
    let state = setup_state()?;
    let product = create_product(&state, "Polo Shirt", dec!(699), 10).await?;
    let fresh = place_order(&state, &product, 1, DeliveryMethod::Delivery).await?.order.id;
    let started = place_order(&state, &product, 1, DeliveryMethod::Delivery).await?.order.id;

    let cancelled = order_service::update_order_status(&state, &head_admin(), &fresh, status("cancelled"))
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    order_service::update_order_status(&state, &head_admin(), &started, status("processing")).await?;
    let cancelled = order_service::update_order_status(&state, &head_admin(), &started, status("cancelled"))
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    for next in ["pending", "processing", "completed", "cancelled"] {
        let moved = order_service::update_order_status(&state, &head_admin(), &fresh, status(next)).await;
        assert!(matches!(moved, Err(AppError::Precondition(_))), "cancelled -> {next}");
    }
    let order = order_service::get_order(&state, &fresh).await?.data.expect("order");
    assert_eq!(order.status, OrderStatus::Cancelled);
    Ok(())
}

#[tokio::test]
async fn resellers_cannot_edit_products_directly() -> anyhow::Result<()> {
    let state = setup_state()?;
    let reseller = session_for(&create_member(&state, "rhea", Role::Reseller).await?);
    let product = create_product(&state, "Bucket Hat", dec!(399), 3).await?;

    let stock = product_service::set_stock(
        &state,
        &reseller,
        &product.id,
        SetStockRequest { stock: 999 },
    )
    .await;
    assert!(matches!(stock, Err(AppError::Forbidden)));

    let edit = product_service::update_product(
        &state,
        &reseller,
        &product.id,
        UpdateProductRequest {
            price: Some(dec!(1)),
            stock: Some(500),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(edit, Err(AppError::Forbidden)));

    let stored = state.store.repo::<Product>().find(&product.id).await?;
    assert_eq!(stored.stock, 3);
    assert_eq!(stored.price, dec!(399));

    let updated = product_service::set_stock(
        &state,
        &head_admin(),
        &product.id,
        SetStockRequest { stock: 12 },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(updated.stock, 12);
    Ok(())
}

// Notifications issued while a mark-all-read is in flight must survive it.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mark_all_read_keeps_concurrent_notifications() -> anyhow::Result<()> {
    let state = setup_state()?;
    let mut tasks = Vec::new();
    for n in 0..20 {
        let notify_state = state.clone();
        tasks.push(tokio::spawn(async move {
            notification_service::notify(
                &notify_state,
                Audience::Role(Role::HeadAdmin),
                "New Stock Request",
                format!("request {n}"),
            )
            .await
            .map(|_| ())
        }));
        let state = state.clone();
        tasks.push(tokio::spawn(async move {
            notification_service::mark_all_read(&state, &head_admin())
                .await
                .map(|_| ())
        }));
    }
    for task in tasks {
        task.await??;
    }

    let inbox = notification_service::list_notifications(&state, &head_admin()).await?;
    assert_eq!(inbox.data.expect("inbox").len(), 20);
    Ok(())
}

#[tokio::test]
async fn head_admin_quota_is_two() -> anyhow::Result<()> {
    let state = setup_state()?;
    member_service::provision_default_admin(&state).await?;
    create_member(&state, "second", Role::HeadAdmin).await?;

    let third = create_member(&state, "third", Role::HeadAdmin).await;
    assert!(third.is_err());

    let reseller = create_member(&state, "promote-me", Role::Reseller).await?;
    let promote = member_service::update_member(
        &state,
        &head_admin(),
        &reseller.id,
        UpdateMemberRequest {
            role: Some(Role::HeadAdmin),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(promote, Err(AppError::Validation(_))));

    let members = member_service::list_members(&state, &head_admin()).await?;
    let heads = members
        .data
        .expect("members")
        .iter()
        .filter(|m| m.role == Role::HeadAdmin)
        .count();
    assert_eq!(heads, 2);

    let duplicate = create_member(&state, "second", Role::Reseller).await;
    assert!(duplicate.is_err());
    Ok(())
}

#[tokio::test]
async fn stock_never_goes_negative() -> anyhow::Result<()> {
    let state = setup_state()?;
    let product = create_product(&state, "Ferris Cap", dec!(350), 2).await?;

    let negative = product_service::set_stock(
        &state,
        &head_admin(),
        &product.id,
        SetStockRequest { stock: -1 },
    )
    .await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let overdraw = product_service::adjust_stock(&state, &product.id, -3).await;
    assert!(overdraw.is_err());
    assert_eq!(state.store.repo::<Product>().find(&product.id).await?.stock, 2);

    let low = product_service::list_low_stock(&state, LowStockQuery { threshold: None }).await?;
    let ids: Vec<String> = low.data.expect("low").into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![product.id]);
    Ok(())
}

#[tokio::test]
async fn notifications_are_scoped_and_marked_read() -> anyhow::Result<()> {
    let state = setup_state()?;
    let rhea = session_for(&create_member(&state, "rhea", Role::Reseller).await?);
    let lito = session_for(&create_member(&state, "lito", Role::Reseller).await?);
    let product = create_product(&state, "Denim Jacket", dec!(1999), 8).await?;

    for quantity in [1, 2] {
        stock_request_service::create_stock_request(
            &state,
            &rhea,
            CreateStockRequest {
                product_id: product.id.clone(),
                quantity,
                reason: String::new(),
            },
        )
        .await?;
    }
    let order_id = place_order(&state, &product, 1, DeliveryMethod::Delivery)
        .await?
        .order
        .id;
    order_service::assign_order(
        &state,
        &head_admin(),
        &order_id,
        storefront_admin_api::dto::orders::AssignOrderRequest {
            assignee: Some("rhea".into()),
        },
    )
    .await?;

    let admin = notification_service::list_notifications(&state, &head_admin()).await?;
    assert_eq!(admin.meta.as_ref().and_then(|m| m.unread), Some(2));
    assert_eq!(
        notification_service::unread_count(&state, &rhea).await?.data,
        Some(1)
    );
    assert_eq!(
        notification_service::unread_count(&state, &lito).await?.data,
        Some(0)
    );

    let rhea_note = notification_service::list_notifications(&state, &rhea)
        .await?
        .data
        .expect("inbox")
        .remove(0);
    let hidden = notification_service::mark_read(&state, &lito, &rhea_note.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    let marked = notification_service::mark_all_read(&state, &head_admin()).await?;
    assert_eq!(marked.data, Some(2));
    assert_eq!(
        notification_service::unread_count(&state, &head_admin()).await?.data,
        Some(0)
    );
    assert_eq!(
        notification_service::unread_count(&state, &rhea).await?.data,
        Some(1)
    );
    Ok(())
}

#[tokio::test]
async fn report_request_is_generated_by_the_reseller() -> anyhow::Result<()> {
    let state = setup_state()?;
    let reseller_view = create_member(&state, "rhea", Role::Reseller).await?;
    let reseller = session_for(&reseller_view);
    let outsider = session_for(&create_member(&state, "lito", Role::Reseller).await?);

    let backwards = report_service::create_report_request(
        &state,
        &head_admin(),
        CreateReportRequest {
            reseller_id: reseller_view.id.clone(),
            report_type: ReportType::Sales,
            date_from: "2025-02-01".parse()?,
            date_to: "2025-01-01".parse()?,
            notes: String::new(),
        },
    )
    .await;
    assert!(matches!(backwards, Err(AppError::Validation(_))));

    let request = report_service::create_report_request(
        &state,
        &head_admin(),
        CreateReportRequest {
            reseller_id: reseller_view.id.clone(),
            report_type: ReportType::Sales,
            date_from: "2025-01-01".parse()?,
            date_to: "2025-01-31".parse()?,
            notes: "January".into(),
        },
    )
    .await?
    .data
    .expect("request");

    let early = report_service::generate_report(
        &state,
        &reseller,
        &request.id,
        GenerateReportRequest::default(),
    )
    .await;
    assert!(matches!(early, Err(AppError::Precondition(_))));

    report_service::approve_report_request(&state, &head_admin(), &request.id).await?;

    let foreign = report_service::generate_report(
        &state,
        &outsider,
        &request.id,
        GenerateReportRequest::default(),
    )
    .await;
    assert!(matches!(foreign, Err(AppError::Forbidden)));

    let incomplete = report_service::generate_report(
        &state,
        &reseller,
        &request.id,
        GenerateReportRequest::default(),
    )
    .await;
    assert!(matches!(incomplete, Err(AppError::Validation(_))));

    let report = report_service::generate_report(
        &state,
        &reseller,
        &request.id,
        GenerateReportRequest {
            notes: "steady month".into(),
            payload: ReportPayload {
                total_sales_amount: Some(dec!(15250.50)),
                total_orders_count: Some(12),
                ..Default::default()
            },
        },
    )
    .await?
    .data
    .expect("report");
    assert_eq!(report.generated_by, "rhea");

    let requests = report_service::list_report_requests(&state, &reseller).await?;
    let request = requests.data.expect("requests").remove(0);
    assert_eq!(request.status, RequestStatus::Completed);

    let reports = report_service::list_reports(&state, &outsider).await?;
    assert!(reports.data.expect("reports").is_empty());
    Ok(())
}

#[test]
fn order_statuses_round_trip_through_labels() {
    for status in OrderStatus::ALL {
        assert_eq!(status.as_str().parse::<OrderStatus>().ok(), Some(*status));
    }
}
