use storefront_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let Some(url) = config.remote_database_url.as_deref() else {
        anyhow::bail!("REMOTE_DATABASE_URL is not configured");
    };
    let orm = create_orm_conn(url).await?;
    run_migrations(&orm, "migrations").await?;
    println!("Migrations applied");
    Ok(())
}
