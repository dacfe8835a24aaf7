mod common;

use common::{checkout_request, create_product, head_admin, setup_state, shopper};
use rust_decimal_macros::dec;
use storefront_admin_api::{
    dto::{
        customers::CreateCustomerRequest,
        storefront::{AddToCartRequest, MoveToCartRequest, UpdateCartLineRequest, WishlistToggleRequest},
    },
    error::AppError,
    models::{DeliveryMethod, InvoiceType, VerificationStatus},
    services::{customer_service, invoice_service, storefront_service},
    verification::FixedVerifier,
};

fn add(product_id: &str, quantity: i32, size: &str) -> AddToCartRequest {
    AddToCartRequest {
        product_id: product_id.into(),
        quantity,
        size: size.into(),
    }
}

// Cart -> delivery checkout: total is items plus the configured fee and the cart empties.
#[tokio::test]
async fn delivery_checkout_charges_fee_and_clears_cart() -> anyhow::Result<()> {
    let state = setup_state()?;
    let shirt = create_product(&state, "Oxford Shirt", dec!(899.50), 10).await?;
    let tote = create_product(&state, "Tote Bag", dec!(499), 10).await?;
    let buyer = shopper("shopper-a");

    storefront_service::add_to_cart(&state, &buyer, add(&shirt.id, 1, "M")).await?;
    storefront_service::add_to_cart(&state, &buyer, add(&shirt.id, 1, "M")).await?;
    let cart = storefront_service::add_to_cart(&state, &buyer, add(&tote.id, 1, ""))
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.item_count, 3);
    assert_eq!(cart.subtotal, dec!(2298));

    let placed = storefront_service::checkout(
        &state,
        &buyer,
        checkout_request(DeliveryMethod::Delivery, "Maria@Example.com"),
    )
    .await?
    .data
    .expect("checkout");

    assert_eq!(placed.order.delivery.fee, dec!(50));
    assert_eq!(placed.order.total, dec!(2348));
    assert_eq!(placed.order.customer.phone, "+639171234567");
    assert!(placed.order.order_number.starts_with("CC"));
    assert!(placed.pre_invoice.is_none());
    assert!(!placed.order.has_pre_invoice);
    assert_eq!(placed.customer.verification(), VerificationStatus::Verified);

    let cart = storefront_service::view_cart(&state, &buyer).await?.data.expect("cart");
    assert!(cart.lines.is_empty());
    Ok(())
}

#[tokio::test]
async fn pickup_checkout_is_free_and_issues_pre_invoice() -> anyhow::Result<()> {
    let state = setup_state()?;
    let shirt = create_product(&state, "Oxford Shirt", dec!(899), 10).await?;
    let buyer = shopper("shopper-b");

    storefront_service::add_to_cart(&state, &buyer, add(&shirt.id, 2, "L")).await?;
    let placed = storefront_service::checkout(
        &state,
        &buyer,
        checkout_request(DeliveryMethod::Pickup, "pickup@example.com"),
    )
    .await?
    .data
    .expect("checkout");

    assert_eq!(placed.order.delivery.fee, dec!(0));
    assert_eq!(placed.order.total, dec!(1798));
    let pre = placed.pre_invoice.expect("pre-invoice");
    assert_eq!(pre.invoice_type, InvoiceType::Pre);
    assert_eq!(placed.order.pre_invoice_id.as_deref(), Some(pre.id.as_str()));

    let verified = invoice_service::verify_invoice(&state, &head_admin(), &pre.id).await?;
    assert_eq!(verified.data.expect("invoice").id, pre.id);
    let twice = invoice_service::verify_invoice(&state, &head_admin(), &pre.id).await;
    assert!(matches!(twice, Err(AppError::Precondition(_))));
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_bad_input_and_failed_verification() -> anyhow::Result<()> {
    let state = setup_state()?;
    let shirt = create_product(&state, "Oxford Shirt", dec!(899), 1).await?;
    let buyer = shopper("shopper-c");

    let empty = storefront_service::checkout(
        &state,
        &buyer,
        checkout_request(DeliveryMethod::Pickup, "c@example.com"),
    )
    .await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let too_many = storefront_service::add_to_cart(&state, &buyer, add(&shirt.id, 2, "S")).await;
    assert!(matches!(too_many, Err(AppError::Validation(_))));
    storefront_service::add_to_cart(&state, &buyer, add(&shirt.id, 1, "S")).await?;

    let mut bad_phone = checkout_request(DeliveryMethod::Pickup, "c@example.com");
    bad_phone.customer.phone = "12345".into();
    let result = storefront_service::checkout(&state, &buyer, bad_phone).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let mut no_selfie = checkout_request(DeliveryMethod::Pickup, "c@example.com");
    no_selfie.selfie = String::new();
    let result = storefront_service::checkout(&state, &buyer, no_selfie).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let mut no_location = checkout_request(DeliveryMethod::Delivery, "c@example.com");
    no_location.delivery_location = None;
    let result = storefront_service::checkout(&state, &buyer, no_location).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let strict = state.clone().with_verifier(FixedVerifier(false));
    let failed = storefront_service::checkout(
        &strict,
        &buyer,
        checkout_request(DeliveryMethod::Pickup, "c@example.com"),
    )
    .await;
    match failed {
        Err(AppError::Validation(message)) => assert!(message.starts_with("Face verification failed")),
        other => panic!("expected verification failure, got {other:?}"),
    }

    let cart = storefront_service::view_cart(&state, &buyer).await?.data.expect("cart");
    assert_eq!(cart.item_count, 1);
    Ok(())
}

#[tokio::test]
async fn repeat_buyer_reuses_customer_record() -> anyhow::Result<()> {
    let state = setup_state()?;
    let shirt = create_product(&state, "Oxford Shirt", dec!(899), 10).await?;

    for shopper_id in ["first-visit", "second-visit"] {
        let buyer = shopper(shopper_id);
        storefront_service::add_to_cart(&state, &buyer, add(&shirt.id, 1, "M")).await?;
        let email = if shopper_id == "first-visit" {
            "repeat@example.com"
        } else {
            "REPEAT@example.com"
        };
        storefront_service::checkout(&state, &buyer, checkout_request(DeliveryMethod::Pickup, email))
            .await?;
    }

    let customers = customer_service::list_customers(&state).await?.data.expect("customers");
    assert_eq!(customers.len(), 1);
    let history = customer_service::customer_history(&state, &customers[0].customer.id)
        .await?
        .data
        .expect("history");
    assert_eq!(history.orders.len(), 2);

    let duplicate = customer_service::create_customer(
        &state,
        &head_admin(),
        CreateCustomerRequest {
            name: "Someone Else".into(),
            email: "repeat@EXAMPLE.com".into(),
            phone: "09171234567".into(),
            address: "Elsewhere".into(),
            barangay: String::new(),
            gender: String::new(),
            age: None,
            gov_id: None,
            selfie_verification: None,
            verification_status: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn wishlist_toggles_and_moves_into_cart() -> anyhow::Result<()> {
    let state = setup_state()?;
    let cap = create_product(&state, "Ferris Cap", dec!(350), 4).await?;
    let buyer = shopper("shopper-d");
    let toggle = || WishlistToggleRequest {
        product_id: cap.id.clone(),
    };

    let added = storefront_service::toggle_wishlist(&state, &buyer, toggle()).await?;
    assert!(added.data.expect("toggle").added);
    let removed = storefront_service::toggle_wishlist(&state, &buyer, toggle()).await?;
    assert!(!removed.data.expect("toggle").added);
    storefront_service::toggle_wishlist(&state, &buyer, toggle()).await?;

    let other = storefront_service::list_wishlist(&state, &shopper("someone-else")).await?;
    assert!(other.data.expect("wishlist").is_empty());

    let unknown = storefront_service::toggle_wishlist(
        &state,
        &buyer,
        WishlistToggleRequest {
            product_id: "PROD_missing".into(),
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    let cart = storefront_service::move_to_cart(&state, &buyer, &cap.id, MoveToCartRequest::default())
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.item_count, 1);
    let wishlist = storefront_service::list_wishlist(&state, &buyer).await?;
    assert!(wishlist.data.expect("wishlist").is_empty());

    let line_id = cart.lines[0].id.clone();
    let updated = storefront_service::update_cart_line(
        &state,
        &buyer,
        &line_id,
        UpdateCartLineRequest { quantity: 3 },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(updated.subtotal, dec!(1050));

    let cleared = storefront_service::remove_cart_line(&state, &buyer, &line_id)
        .await?
        .data
        .expect("cart");
    assert!(cleared.lines.is_empty());
    Ok(())
}

// Shoppers share one cart collection; simultaneous adds must all land.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_shoppers_keep_their_cart_lines() -> anyhow::Result<()> {
    let state = setup_state()?;
    let product = create_product(&state, "Graphic Tee", dec!(450), 100).await?;

    let mut tasks = Vec::new();
    for n in 0..16 {
        let state = state.clone();
        let product_id = product.id.clone();
        tasks.push(tokio::spawn(async move {
            storefront_service::add_to_cart(&state, &shopper(&format!("buyer-{n}")), add(&product_id, 1, "L"))
                .await
                .map(|_| ())
        }));
    }
    for task in tasks {
        task.await??;
    }

    for n in 0..16 {
        let cart = storefront_service::view_cart(&state, &shopper(&format!("buyer-{n}")))
            .await?
            .data
            .expect("cart");
        assert_eq!(cart.item_count, 1, "buyer-{n}");
    }
    Ok(())
}
