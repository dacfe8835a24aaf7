use chrono::{Days, Utc};
use rust_decimal::Decimal;

use crate::{
    dto::storefront::{
        AddToCartRequest, CartView, CheckoutCustomer, CheckoutRequest, CheckoutResponse,
        MoveToCartRequest, UpdateCartLineRequest, WishlistToggleRequest, WishlistToggled,
    },
    error::{AppError, AppResult},
    middleware::auth::ShopperSession,
    models::{
        CartLine, Customer, CustomerSnapshot, Delivery, DeliveryMethod, InvoiceType, Order,
        OrderItem, OrderStatus, Payment, Product, VerificationStatus, WishlistEntry, new_id,
    },
    response::{ApiResponse, Meta},
    services::{
        customer_service::{is_valid_email, same_email},
        invoice_service::issue_invoice,
        settings_service::load_settings,
    },
    state::AppState,
    verification::IdentityDocuments,
};

/// Days between placing an order and its estimated pickup or delivery.
pub const FULFILLMENT_DAYS: u64 = 3;

async fn cart_lines(state: &AppState, shopper: &ShopperSession) -> Vec<CartLine> {
    state
        .store
        .repo::<CartLine>()
        .load()
        .await
        .into_iter()
        .filter(|line| line.shopper_id == shopper.shopper_id)
        .collect()
}

fn cart_view(lines: Vec<CartLine>) -> CartView {
    let item_count = lines.iter().map(|l| l.item.quantity).sum();
    let subtotal = lines.iter().map(|l| l.item.subtotal()).sum::<Decimal>();
    CartView {
        lines,
        item_count,
        subtotal,
    }
}

/// Applies `apply` to the shopper's own lines and writes the cart back under
/// the store lock. Returns the shopper's lines as stored.
async fn update_cart<R>(
    state: &AppState,
    shopper: &ShopperSession,
    apply: impl FnOnce(&mut Vec<CartLine>) -> AppResult<R>,
) -> AppResult<(R, Vec<CartLine>)> {
    state
        .store
        .repo::<CartLine>()
        .modify(|items| {
            let (mut mine, others): (Vec<CartLine>, Vec<CartLine>) = std::mem::take(items)
                .into_iter()
                .partition(|line| line.shopper_id == shopper.shopper_id);
            let result = apply(&mut mine)?;
            *items = others;
            items.extend(mine.iter().cloned());
            Ok((result, mine))
        })
        .await
}

pub async fn view_cart(
    state: &AppState,
    shopper: &ShopperSession,
) -> AppResult<ApiResponse<CartView>> {
    let mine = cart_lines(state, shopper).await;
    Ok(ApiResponse::success("Cart", cart_view(mine), None))
}

pub async fn add_to_cart(
    state: &AppState,
    shopper: &ShopperSession,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::validation("Quantity must be greater than zero"));
    }
    let product = state.store.repo::<Product>().find(&payload.product_id).await?;
    let size = payload.size.trim().to_string();

    let ((), mine) = update_cart(state, shopper, |mine| {
        let existing = mine
            .iter_mut()
            .find(|l| l.item.product_id == product.id && l.item.size == size);
        let requested = existing.as_ref().map_or(0, |l| l.item.quantity) + payload.quantity;
        if requested > product.stock {
            return Err(AppError::validation(format!(
                "Only {} of {} left in stock",
                product.stock, product.name
            )));
        }

        match existing {
            Some(line) => line.item.quantity = requested,
            None => mine.push(CartLine {
                id: new_id("CART"),
                shopper_id: shopper.shopper_id.clone(),
                item: OrderItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    quantity: payload.quantity,
                    size: size.clone(),
                    image: product.image.clone(),
                },
            }),
        }
        Ok(())
    })
    .await?;

    Ok(ApiResponse::success("Added to cart", cart_view(mine), Some(Meta::empty())))
}

pub async fn update_cart_line(
    state: &AppState,
    shopper: &ShopperSession,
    line_id: &str,
    payload: UpdateCartLineRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::validation("Quantity must be greater than zero"));
    }
    let ((), mine) = update_cart(state, shopper, |mine| {
        let line = mine
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(AppError::NotFound)?;
        line.item.quantity = payload.quantity;
        Ok(())
    })
    .await?;
    Ok(ApiResponse::success("Cart updated", cart_view(mine), Some(Meta::empty())))
}

pub async fn remove_cart_line(
    state: &AppState,
    shopper: &ShopperSession,
    line_id: &str,
) -> AppResult<ApiResponse<CartView>> {
    let ((), mine) = update_cart(state, shopper, |mine| {
        let before = mine.len();
        mine.retain(|l| l.id != line_id);
        if mine.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    })
    .await?;
    Ok(ApiResponse::success("Removed from cart", cart_view(mine), Some(Meta::empty())))
}

pub async fn clear_cart(
    state: &AppState,
    shopper: &ShopperSession,
) -> AppResult<ApiResponse<CartView>> {
    update_cart(state, shopper, |mine| {
        mine.clear();
        Ok(())
    })
    .await?;
    Ok(ApiResponse::success("Cart cleared", cart_view(Vec::new()), Some(Meta::empty())))
}

async fn wishlist_entries(state: &AppState, shopper: &ShopperSession) -> Vec<WishlistEntry> {
    state
        .store
        .repo::<WishlistEntry>()
        .load()
        .await
        .into_iter()
        .filter(|e| e.shopper_id == shopper.shopper_id)
        .collect()
}

/// Wishlisted products that still exist in the catalog.
pub async fn list_wishlist(
    state: &AppState,
    shopper: &ShopperSession,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let mine = wishlist_entries(state, shopper).await;
    let products = state.store.repo::<Product>().load().await;
    let items: Vec<Product> = mine
        .iter()
        .filter_map(|e| products.iter().find(|p| p.id == e.product_id).cloned())
        .collect();
    Ok(ApiResponse::list("Wishlist", items))
}

pub async fn toggle_wishlist(
    state: &AppState,
    shopper: &ShopperSession,
    payload: WishlistToggleRequest,
) -> AppResult<ApiResponse<WishlistToggled>> {
    let product = match state.store.repo::<Product>().find(&payload.product_id).await {
        Ok(product) => Some(product),
        Err(AppError::NotFound) => None,
        Err(err) => return Err(err),
    };

    let added = state
        .store
        .repo::<WishlistEntry>()
        .modify(|items| {
            let before = items.len();
            items.retain(|e| {
                !(e.shopper_id == shopper.shopper_id && e.product_id == payload.product_id)
            });
            if items.len() < before {
                return Ok(false);
            }
            let product = product.ok_or(AppError::NotFound)?;
            items.push(WishlistEntry {
                id: new_id("WISH"),
                shopper_id: shopper.shopper_id.clone(),
                product_id: product.id,
                added_at: Utc::now(),
            });
            Ok(true)
        })
        .await?;

    let message = if added { "Added to wishlist" } else { "Removed from wishlist" };
    Ok(ApiResponse::success(message, WishlistToggled { added }, Some(Meta::empty())))
}

/// Adds one unit of a wishlisted product to the cart and drops it from the wishlist.
pub async fn move_to_cart(
    state: &AppState,
    shopper: &ShopperSession,
    product_id: &str,
    payload: MoveToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let mine = wishlist_entries(state, shopper).await;
    if !mine.iter().any(|e| e.product_id == product_id) {
        return Err(AppError::NotFound);
    }
    let cart = add_to_cart(
        state,
        shopper,
        AddToCartRequest {
            product_id: product_id.to_string(),
            quantity: 1,
            size: payload.size,
        },
    )
    .await?;

    state
        .store
        .repo::<WishlistEntry>()
        .modify(|items| {
            items.retain(|e| !(e.shopper_id == shopper.shopper_id && e.product_id == product_id));
            Ok(())
        })
        .await?;
    Ok(cart)
}

/// Normalizes a Philippine mobile number to `+639XXXXXXXXX`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let local = digits
        .strip_prefix("+63")
        .or_else(|| digits.strip_prefix("63").filter(|rest| rest.len() == 10))
        .or_else(|| digits.strip_prefix('0').filter(|rest| rest.len() == 10))
        .unwrap_or(&digits);
    let valid = local.len() == 10
        && local.starts_with('9')
        && local.chars().all(|c| c.is_ascii_digit());
    valid.then(|| format!("+63{local}"))
}

fn validate_checkout_customer(customer: &CheckoutCustomer) -> AppResult<String> {
    let name = customer.name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(AppError::validation("Name may only contain letters and spaces"));
    }
    if !is_valid_email(&customer.email) {
        return Err(AppError::validation("A valid email is required"));
    }
    if customer.address.trim().is_empty() {
        return Err(AppError::validation("Address is required"));
    }
    if customer.age.is_some_and(|age| !(0..=150).contains(&age)) {
        return Err(AppError::validation("Age is out of range"));
    }
    normalize_phone(&customer.phone)
        .ok_or_else(|| AppError::validation("Phone number must look like 9XXXXXXXXX"))
}

/// Places an order from the shopper's cart.
///
/// Runs as a best-effort sequence: customer upsert, order, pre-invoice for
/// pickup, cart clear. A failure part-way leaves the earlier writes in place.
pub async fn checkout(
    state: &AppState,
    shopper: &ShopperSession,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let phone = validate_checkout_customer(&payload.customer)?;
    let alt_contact = payload
        .customer
        .alt_contact
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| normalize_phone(c).ok_or_else(|| AppError::validation("Alternate contact is not a valid number")))
        .transpose()?;
    if payload.delivery_method == DeliveryMethod::Delivery
        && payload.delivery_location.as_deref().is_none_or(|l| l.trim().is_empty())
    {
        return Err(AppError::validation("A delivery location is required"));
    }

    let lines = cart_lines(state, shopper).await;
    if lines.is_empty() {
        return Err(AppError::validation("Your cart is empty"));
    }

    let documents = IdentityDocuments {
        gov_id_front: &payload.gov_id_front,
        gov_id_back: &payload.gov_id_back,
        selfie: &payload.selfie,
    };
    if !documents.is_complete() {
        return Err(AppError::validation(
            "Government ID (front and back) and a selfie are required",
        ));
    }
    if !state.verifier.verify(&documents) {
        tracing::info!(shopper = %shopper.shopper_id, "identity verification failed");
        return Err(AppError::validation(
            "Face verification failed. Please retake your selfie",
        ));
    }

    let settings = load_settings(state).await;
    let fee = match payload.delivery_method {
        DeliveryMethod::Pickup => Decimal::ZERO,
        DeliveryMethod::Delivery => settings.delivery_fee,
    };
    let now = Utc::now();
    let estimated_date = now
        .date_naive()
        .checked_add_days(Days::new(FULFILLMENT_DAYS))
        .map(|d| d.to_string())
        .unwrap_or_default();

    let customer = upsert_customer(state, &payload, &phone, &documents).await?;

    let items: Vec<OrderItem> = lines.into_iter().map(|l| l.item).collect();
    let total = Order::compute_total(&items, fee);
    let order = Order {
        id: new_id("ORD"),
        order_number: format!("CC{}", now.timestamp_millis()),
        customer: CustomerSnapshot {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone,
            address: customer.address.clone(),
            barangay: customer.barangay.clone(),
            gender: customer.gender.clone(),
            age: customer.age,
            alt_contact,
            notes: payload
                .customer
                .notes
                .clone()
                .filter(|n| !n.trim().is_empty())
                .or_else(|| Some("None".to_string())),
        },
        items,
        total,
        status: OrderStatus::Pending,
        delivery: Delivery {
            method: payload.delivery_method,
            location: payload.delivery_location.clone(),
            fee,
            estimated_date,
        },
        payment: Payment {
            method: payload.payment_method,
            payment_type: payload.payment_type.clone(),
        },
        has_pre_invoice: false,
        has_real_invoice: false,
        pre_invoice_id: None,
        real_invoice_id: None,
        requested_by: None,
        assigned_to: None,
        created_at: now,
    };
    let mut order = state.store.repo::<Order>().create(order).await?;
    tracing::info!(order_id = %order.id, order_number = %order.order_number, total = %order.total, "order placed");

    let mut pre_invoice = None;
    if order.delivery.method == DeliveryMethod::Pickup {
        let (updated, invoice) = issue_invoice(state, order, InvoiceType::Pre, "storefront").await?;
        order = updated;
        pre_invoice = Some(invoice);
    }

    update_cart(state, shopper, |mine| {
        mine.clear();
        Ok(())
    })
    .await?;

    Ok(ApiResponse::success(
        "Order placed",
        CheckoutResponse {
            order,
            customer,
            pre_invoice,
        },
        Some(Meta::empty()),
    ))
}

async fn upsert_customer(
    state: &AppState,
    payload: &CheckoutRequest,
    phone: &str,
    documents: &IdentityDocuments<'_>,
) -> AppResult<Customer> {
    let details = &payload.customer;
    let repo = state.store.repo::<Customer>();
    let existing = repo
        .load()
        .await
        .into_iter()
        .find(|c| same_email(&c.email, &details.email));

    let mut customer = existing.clone().unwrap_or_else(|| Customer {
        id: new_id("CUST"),
        name: String::new(),
        email: details.email.trim().to_string(),
        phone: String::new(),
        address: String::new(),
        barangay: String::new(),
        gender: String::new(),
        age: None,
        gov_id: None,
        selfie_verification: None,
        verification_status: None,
        created_at: Some(Utc::now()),
    });
    customer.name = details.name.trim().to_string();
    customer.phone = phone.to_string();
    customer.address = details.address.trim().to_string();
    customer.barangay = details.barangay.clone();
    customer.gender = details.gender.clone();
    customer.age = details.age.or(customer.age);
    customer.gov_id = Some(documents.gov_id_front.to_string());
    customer.selfie_verification = Some(documents.selfie.to_string());
    customer.verification_status = Some(VerificationStatus::Verified.to_string());

    match existing {
        Some(_) => repo.update(customer).await,
        None => repo.create(customer).await,
    }
}
