use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;

use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{AppError, AppResult};

/// Collection keys in the local store.
pub mod keys {
    pub const PRODUCTS: &str = "admin_products";
    pub const ORDERS: &str = "admin_orders";
    pub const CUSTOMERS: &str = "admin_customers";
    pub const MEMBERS: &str = "admin_members";
    pub const SETTINGS: &str = "admin_settings";
    pub const INVOICES: &str = "admin_invoices";
    pub const STOCK_REQUESTS: &str = "admin_stock_requests";
    pub const REPORT_REQUESTS: &str = "admin_report_requests";
    pub const REPORTS: &str = "admin_reports";
    pub const NOTIFICATIONS: &str = "admin_notifications";
    pub const CART: &str = "user_cart";
    pub const WISHLIST: &str = "user_wishlist";
}

enum Backend {
    Directory(PathBuf),
    Memory(StdMutex<HashMap<String, String>>),
}

/// String-keyed persistent store holding one JSON document per collection.
///
/// Every collection is read and written wholesale. Collections are
/// independent: two saves issued by one logical operation are not atomic,
/// and the first stays committed if the second fails.
pub struct LocalStore {
    backend: Backend,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Persists each collection as `<dir>/<key>.json`.
    pub fn directory(dir: impl AsRef<Path>) -> Self {
        Self {
            backend: Backend::Directory(dir.as_ref().to_path_buf()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(StdMutex::new(HashMap::new())),
            write_lock: Mutex::new(()),
        }
    }

    /// Serializes read-modify-write sequences against the local collections.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        match &self.backend {
            Backend::Directory(dir) => match fs::read_to_string(dir.join(format!("{key}.json"))).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            },
            Backend::Memory(map) => {
                let map = map
                    .lock()
                    .map_err(|_| AppError::Storage("local store poisoned".into()))?;
                Ok(map.get(key).cloned())
            }
        }
    }

    pub async fn set_raw(&self, key: &str, value: String) -> AppResult<()> {
        match &self.backend {
            Backend::Directory(dir) => {
                fs::create_dir_all(dir).await?;
                let target = dir.join(format!("{key}.json"));
                let staging = dir.join(format!(".{key}.json.tmp"));
                fs::write(&staging, value).await?;
                fs::rename(&staging, &target).await?;
                Ok(())
            }
            Backend::Memory(map) => {
                let mut map = map
                    .lock()
                    .map_err(|_| AppError::Storage("local store poisoned".into()))?;
                map.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// Loads a collection. Absent, unreadable, or malformed payloads yield an
    /// empty collection.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.load_value::<Vec<T>>(key).await {
            Some(items) => items,
            None => Vec::new(),
        }
    }

    /// Replaces a collection wholesale.
    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> AppResult<()> {
        self.save_value(key, &items).await
    }

    pub async fn load_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(collection = key, error = %err, "local collection unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(collection = key, error = %err, "malformed local collection, treating as empty");
                None
            }
        }
    }

    pub async fn save_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Storage(format!("serialize {key}: {e}")))?;
        self.set_raw(key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: String,
        qty: i32,
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry { id: "b".into(), qty: 2 },
            Entry { id: "a".into(), qty: 1 },
            Entry { id: "c".into(), qty: 3 },
        ]
    }

    #[tokio::test]
    async fn save_then_load_preserves_order() {
        let store = LocalStore::in_memory();
        store.save(keys::PRODUCTS, &entries()).await.unwrap();
        let loaded: Vec<Entry> = store.load(keys::PRODUCTS).await;
        assert_eq!(loaded, entries());
    }

    #[tokio::test]
    async fn missing_and_malformed_collections_load_empty() {
        let store = LocalStore::in_memory();
        let missing: Vec<Entry> = store.load(keys::ORDERS).await;
        assert!(missing.is_empty());

        store.set_raw(keys::ORDERS, "{not json".into()).await.unwrap();
        let corrupt: Vec<Entry> = store.load(keys::ORDERS).await;
        assert!(corrupt.is_empty());
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = LocalStore::in_memory();
        store.save(keys::ORDERS, &entries()).await.unwrap();
        store.set_raw(keys::INVOICES, "[]]".into()).await.unwrap();

        let orders: Vec<Entry> = store.load(keys::ORDERS).await;
        let invoices: Vec<Entry> = store.load(keys::INVOICES).await;
        assert_eq!(orders.len(), 3);
        assert!(invoices.is_empty());
    }

    #[tokio::test]
    async fn directory_backend_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::directory(dir.path().join("data"));

        store.save(keys::MEMBERS, &entries()).await.unwrap();
        store.save(keys::MEMBERS, &entries()[..1]).await.unwrap();

        let reopened = LocalStore::directory(dir.path().join("data"));
        let loaded: Vec<Entry> = reopened.load(keys::MEMBERS).await;
        assert_eq!(loaded, vec![Entry { id: "b".into(), qty: 2 }]);
    }
}
