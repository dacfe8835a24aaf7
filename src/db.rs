use std::path::{Path, PathBuf};

use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::fs;

use crate::config::AppConfig;
use crate::store::{Store, local::LocalStore, remote::RemoteStore};

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Builds the store over `DATA_DIR` and attaches the remote backend when one is
/// configured. A backend that cannot be reached at startup leaves the store in
/// local mode.
pub async fn open_store(config: &AppConfig) -> Result<Store> {
    let store = Store::new(LocalStore::directory(&config.data_dir))?;
    let Some(url) = config.remote_database_url.as_deref() else {
        tracing::info!(data_dir = %config.data_dir.display(), "remote backend not configured, using local store");
        return Ok(store);
    };

    match create_orm_conn(url).await {
        Ok(conn) => {
            store.attach_remote(RemoteStore::new(conn), url);
            tracing::info!("remote backend attached");
        }
        Err(err) => {
            tracing::warn!(error = %err, "remote backend unreachable, using local store");
        }
    }
    Ok(store)
}

/// Minimal migration runner that executes SQL files in `dir` in filename order.
pub async fn run_migrations(conn: &DatabaseConnection, dir: impl AsRef<Path>) -> Result<()> {
    let mut entries = fs::read_dir(dir.as_ref()).await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        tracing::info!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let statement = format!("{stmt};");
            conn.execute(Statement::from_string(backend, statement))
                .await?;
        }
    }

    Ok(())
}
