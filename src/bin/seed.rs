use chrono::Utc;
use rust_decimal::Decimal;
use storefront_admin_api::{
    config::AppConfig,
    db::open_store,
    models::{Member, MemberStatus, Product, Role, new_id},
    services::{auth_service::hash_password, member_service, settings_service},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let store = open_store(&config).await?;
    let state = AppState::new(store, &config);

    member_service::provision_default_admin(&state).await?;
    settings_service::provision_default_settings(&state).await?;
    ensure_reseller(&state, "reseller", "reseller123").await?;
    seed_products(&state).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_reseller(state: &AppState, username: &str, password: &str) -> anyhow::Result<()> {
    let repo = state.store.repo::<Member>();
    if repo.load().await.iter().any(|m| m.username == username) {
        println!("Reseller {username} already exists");
        return Ok(());
    }
    repo.create(Member {
        id: new_id(Role::Reseller.as_str()),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        role: Role::Reseller,
        status: MemberStatus::Active,
        created_date: Utc::now(),
        last_login: None,
    })
    .await?;
    println!("Ensured reseller {username}");
    Ok(())
}

async fn seed_products(state: &AppState) -> anyhow::Result<()> {
    let products = vec![
        ("Classic Oxford Shirt", "Long sleeve cotton oxford", "Tops", 89900, 40),
        ("Linen Wide-Leg Pants", "Breathable summer linen", "Bottoms", 124900, 25),
        ("Everyday Tote Bag", "Canvas tote with inner pocket", "Accessories", 49900, 60),
        ("Knit Cardigan", "Relaxed fit, ribbed cuffs", "Outerwear", 149900, 4),
    ];

    let repo = state.store.repo::<Product>();
    let existing = repo.load().await;
    for (name, description, category, cents, stock) in products {
        if existing.iter().any(|p| p.name == name) {
            continue;
        }
        repo.create(Product {
            id: new_id("PROD"),
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            description: description.to_string(),
            category: category.to_string(),
            stock,
            image: None,
        })
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
