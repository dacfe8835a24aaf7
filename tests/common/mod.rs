#![allow(dead_code)]

use std::path::PathBuf;

use rust_decimal::Decimal;
use storefront_admin_api::{
    config::AppConfig,
    dto::{
        members::CreateMemberRequest,
        products::CreateProductRequest,
        storefront::{AddToCartRequest, CheckoutCustomer, CheckoutRequest, CheckoutResponse},
    },
    middleware::auth::{Session, ShopperSession},
    models::{DeliveryMethod, MemberView, PaymentMethod, Product, Role},
    services::{member_service, product_service, storefront_service},
    state::AppState,
    store::{Store, local::LocalStore},
    verification::FixedVerifier,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        data_dir: PathBuf::from("unused"),
        remote_database_url: None,
        jwt_secret: "test-secret".into(),
        session_ttl_hours: 1,
        verification_pass_rate: 1.0,
    }
}

/// In-memory, local-mode state with a verifier that always passes.
pub fn setup_state() -> anyhow::Result<AppState> {
    let store = Store::new(LocalStore::in_memory())?;
    Ok(AppState::new(store, &test_config()).with_verifier(FixedVerifier(true)))
}

pub fn head_admin() -> Session {
    Session {
        member_id: "head_admin_1".into(),
        username: "admin".into(),
        role: Role::HeadAdmin,
    }
}

pub fn session_for(member: &MemberView) -> Session {
    Session {
        member_id: member.id.clone(),
        username: member.username.clone(),
        role: member.role,
    }
}

pub async fn create_member(
    state: &AppState,
    username: &str,
    role: Role,
) -> anyhow::Result<MemberView> {
    let resp = member_service::create_member(
        state,
        &head_admin(),
        CreateMemberRequest {
            username: username.into(),
            password: "secret123".into(),
            role,
            status: None,
        },
    )
    .await?;
    Ok(resp.data.expect("member"))
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: Decimal,
    stock: i32,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        &head_admin(),
        CreateProductRequest {
            name: name.into(),
            price,
            description: Some(format!("{name} for testing")),
            category: Some("Tops".into()),
            stock,
            image: None,
        },
    )
    .await?;
    Ok(resp.data.expect("product"))
}

pub fn shopper(id: &str) -> ShopperSession {
    ShopperSession {
        shopper_id: id.into(),
    }
}

pub fn checkout_request(method: DeliveryMethod, email: &str) -> CheckoutRequest {
    CheckoutRequest {
        customer: CheckoutCustomer {
            name: "Maria Santos".into(),
            email: email.into(),
            phone: "0917 123 4567".into(),
            address: "123 Rizal St".into(),
            barangay: "San Vicente".into(),
            gender: "female".into(),
            age: Some(28),
            alt_contact: None,
            notes: None,
        },
        delivery_method: method,
        delivery_location: (method == DeliveryMethod::Delivery).then(|| "Tarlac City".to_string()),
        payment_method: PaymentMethod::Cash,
        payment_type: None,
        gov_id_front: "front.jpg".into(),
        gov_id_back: "back.jpg".into(),
        selfie: "selfie.jpg".into(),
    }
}

/// Places an order of `quantity` units of `product` through the storefront.
pub async fn place_order(
    state: &AppState,
    product: &Product,
    quantity: i32,
    method: DeliveryMethod,
) -> anyhow::Result<CheckoutResponse> {
    let buyer = shopper("shopper-1");
    storefront_service::add_to_cart(
        state,
        &buyer,
        AddToCartRequest {
            product_id: product.id.clone(),
            quantity,
            size: "M".into(),
        },
    )
    .await?;
    let resp =
        storefront_service::checkout(state, &buyer, checkout_request(method, "maria@example.com"))
            .await?;
    Ok(resp.data.expect("checkout"))
}
