//! Dual-mode persistence: every repository operation asks [`Store::is_remote_active`]
//! whether the remote backend or the local store is authoritative.

pub mod local;
pub mod mapping;
pub mod remote;

use std::marker::PhantomData;
use std::sync::RwLock;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::config::is_configured_endpoint;
use crate::error::{AppError, AppResult};
use crate::models::{
    CartLine, Customer, Invoice, Member, Notification, Order, Product, Report, ReportRequest,
    StockRequest, WishlistEntry,
};

use local::{LocalStore, keys};
use mapping::{ColumnMap, Row};
use remote::RemoteStore;

/// An entity kind persisted as one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Local collection key.
    const COLLECTION: &'static str;

    /// Remote table mapping; `None` keeps the collection local-only.
    fn remote() -> Option<&'static ColumnMap> {
        None
    }

    fn id(&self) -> &str;
}

macro_rules! record {
    ($ty:ty, $key:expr, $map:expr) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $key;

            fn remote() -> Option<&'static ColumnMap> {
                Some(&$map)
            }

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
    ($ty:ty, $key:expr) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $key;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

record!(Product, keys::PRODUCTS, mapping::PRODUCTS);
record!(Customer, keys::CUSTOMERS, mapping::CUSTOMERS);
record!(Member, keys::MEMBERS, mapping::MEMBERS);
record!(Order, keys::ORDERS, mapping::ORDERS);
record!(Invoice, keys::INVOICES, mapping::INVOICES);
record!(StockRequest, keys::STOCK_REQUESTS, mapping::STOCK_REQUESTS);
record!(ReportRequest, keys::REPORT_REQUESTS, mapping::REPORT_REQUESTS);
record!(Report, keys::REPORTS, mapping::REPORTS);
record!(Notification, keys::NOTIFICATIONS);
record!(CartLine, keys::CART);
record!(WishlistEntry, keys::WISHLIST);

#[derive(Default)]
struct RemoteConfig {
    client: Option<RemoteStore>,
    endpoint: Option<String>,
}

pub struct Store {
    local: LocalStore,
    remote: RwLock<RemoteConfig>,
}

impl Store {
    pub fn new(local: LocalStore) -> AppResult<Self> {
        mapping::validate_all().map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        Ok(Self {
            local,
            remote: RwLock::new(RemoteConfig::default()),
        })
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn attach_remote(&self, client: RemoteStore, endpoint: impl Into<String>) {
        let mut remote = self.remote.write().unwrap_or_else(|e| e.into_inner());
        remote.client = Some(client);
        remote.endpoint = Some(endpoint.into());
    }

    /// True only when a client handle exists and its endpoint is configured
    /// and not a placeholder. Evaluated on every call.
    pub fn is_remote_active(&self) -> bool {
        self.remote_client().is_some()
    }

    /// The remote client when remote mode is active.
    pub fn remote_client(&self) -> Option<RemoteStore> {
        let remote = self.remote.read().unwrap_or_else(|e| e.into_inner());
        match (&remote.client, remote.endpoint.as_deref()) {
            (Some(client), Some(endpoint)) if is_configured_endpoint(endpoint) => {
                Some(client.clone())
            }
            _ => None,
        }
    }

    pub fn repo<E: Record>(&self) -> Repository<'_, E> {
        Repository {
            store: self,
            _entity: PhantomData,
        }
    }
}

/// A loaded collection. `degraded` is set when the remote read failed and the
/// last local snapshot was returned instead.
#[derive(Debug, Clone)]
pub struct Snapshot<E> {
    pub items: Vec<E>,
    pub degraded: bool,
}

pub struct Repository<'a, E> {
    store: &'a Store,
    _entity: PhantomData<E>,
}

impl<'a, E: Record> Repository<'a, E> {
    fn remote(&self) -> Option<(RemoteStore, &'static ColumnMap)> {
        let map = E::remote()?;
        self.store.remote_client().map(|client| (client, map))
    }

    pub async fn load_snapshot(&self) -> Snapshot<E> {
        let Some((client, map)) = self.remote() else {
            return Snapshot {
                items: self.store.local.load(E::COLLECTION).await,
                degraded: false,
            };
        };

        match client.fetch_all(map).await {
            Ok(rows) => {
                let items: Vec<E> = rows.iter().filter_map(|row| decode(map, row)).collect();
                let _guard = self.store.local.lock().await;
                if let Err(err) = self.store.local.save(E::COLLECTION, &items).await {
                    tracing::warn!(collection = E::COLLECTION, error = %err, "local snapshot refresh failed");
                }
                Snapshot {
                    items,
                    degraded: false,
                }
            }
            Err(err) => {
                tracing::warn!(
                    collection = E::COLLECTION,
                    error = %err,
                    "remote read failed, serving local snapshot"
                );
                Snapshot {
                    items: self.store.local.load(E::COLLECTION).await,
                    degraded: true,
                }
            }
        }
    }

    pub async fn load(&self) -> Vec<E> {
        self.load_snapshot().await.items
    }

    pub async fn find(&self, id: &str) -> AppResult<E> {
        self.load()
            .await
            .into_iter()
            .find(|e| e.id() == id)
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, entity: E) -> AppResult<E> {
        if let Some((client, map)) = self.remote() {
            let row = map.to_row(&to_json(&entity)?);
            let inserted = client.insert(map, &row).await?;
            let stored = decode(map, &inserted).unwrap_or(entity);
            let mirrored = stored.clone();
            self.mirror(move |items| items.push(mirrored)).await;
            return Ok(stored);
        }

        let _guard = self.store.local.lock().await;
        let mut items: Vec<E> = self.store.local.load(E::COLLECTION).await;
        items.push(entity.clone());
        self.store.local.save(E::COLLECTION, &items).await?;
        Ok(entity)
    }

    /// Replaces the stored entity carrying the same id. Last write wins.
    pub async fn update(&self, entity: E) -> AppResult<E> {
        if let Some((client, map)) = self.remote() {
            let row = map.to_row(&to_json(&entity)?);
            client.update(map, entity.id(), &row).await.map_err(not_found)?;
            let mirrored = entity.clone();
            self.mirror(move |items| {
                replace(items, mirrored);
            })
            .await;
            return Ok(entity);
        }

        let _guard = self.store.local.lock().await;
        let mut items: Vec<E> = self.store.local.load(E::COLLECTION).await;
        if !replace(&mut items, entity.clone()) {
            return Err(AppError::NotFound);
        }
        self.store.local.save(E::COLLECTION, &items).await?;
        Ok(entity)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if let Some((client, map)) = self.remote() {
            client.delete(map, id).await.map_err(not_found)?;
            let id = id.to_string();
            self.mirror(move |items| items.retain(|e| e.id() != id)).await;
            return Ok(());
        }

        let _guard = self.store.local.lock().await;
        let mut items: Vec<E> = self.store.local.load(E::COLLECTION).await;
        let before = items.len();
        items.retain(|e| e.id() != id);
        if items.len() == before {
            return Err(AppError::NotFound);
        }
        self.store.local.save(E::COLLECTION, &items).await
    }

    /// Read-modify-write of the local collection with the store lock held
    /// from load to save. Nothing is written when `apply` fails.
    pub async fn modify<R>(
        &self,
        apply: impl FnOnce(&mut Vec<E>) -> AppResult<R>,
    ) -> AppResult<R> {
        let _guard = self.store.local.lock().await;
        let mut items: Vec<E> = self.store.local.load(E::COLLECTION).await;
        let result = apply(&mut items)?;
        self.store.local.save(E::COLLECTION, &items).await?;
        Ok(result)
    }

    /// Applies a confirmed remote write to the local snapshot. Failures only warn.
    async fn mirror(&self, apply: impl FnOnce(&mut Vec<E>)) {
        let _guard = self.store.local.lock().await;
        let mut items: Vec<E> = self.store.local.load(E::COLLECTION).await;
        apply(&mut items);
        if let Err(err) = self.store.local.save(E::COLLECTION, &items).await {
            tracing::warn!(collection = E::COLLECTION, error = %err, "local mirror write failed");
        }
    }
}

fn replace<E: Record>(items: &mut [E], entity: E) -> bool {
    match items.iter_mut().find(|e| e.id() == entity.id()) {
        Some(slot) => {
            *slot = entity;
            true
        }
        None => false,
    }
}

fn not_found(err: sea_orm::DbErr) -> AppError {
    match err {
        sea_orm::DbErr::RecordNotFound(_) => AppError::NotFound,
        other => AppError::Remote(other),
    }
}

fn to_json<E: Serialize>(entity: &E) -> AppResult<Value> {
    serde_json::to_value(entity).map_err(|e| AppError::Internal(e.into()))
}

fn decode<E: Record>(map: &ColumnMap, row: &Row) -> Option<E> {
    match serde_json::from_value(map.from_row(row)) {
        Ok(entity) => Some(entity),
        Err(err) => {
            tracing::warn!(
                table = map.table,
                id = ?row.get(map.key),
                error = %err,
                "remote row could not be read, skipping"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    use super::*;

    fn product(id: &str, stock: i32) -> Product {
        Product {
            id: id.into(),
            name: format!("Shirt {id}"),
            price: dec!(550),
            description: String::new(),
            category: "tops".into(),
            stock,
            image: None,
        }
    }

    fn store() -> Store {
        Store::new(LocalStore::in_memory()).unwrap()
    }

    #[test]
    fn placeholder_endpoint_keeps_local_mode() {
        let store = store();
        assert!(!store.is_remote_active());

        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        store.attach_remote(
            RemoteStore::new(conn),
            "postgres://db.YOUR-PROJECT-REF.example.co/postgres",
        );
        assert!(!store.is_remote_active());

        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        store.attach_remote(RemoteStore::new(conn), "postgres://localhost/shop");
        assert!(store.is_remote_active());
    }

    #[tokio::test]
    async fn local_crud_round_trip() {
        let store = store();
        let repo = store.repo::<Product>();

        repo.create(product("P1", 3)).await.unwrap();
        repo.create(product("P2", 0)).await.unwrap();
        assert_eq!(repo.find("P2").await.unwrap().stock, 0);

        let mut p1 = repo.find("P1").await.unwrap();
        p1.stock = 8;
        repo.update(p1).await.unwrap();
        assert_eq!(repo.find("P1").await.unwrap().stock, 8);

        repo.delete("P2").await.unwrap();
        assert!(matches!(repo.find("P2").await, Err(AppError::NotFound)));
        assert!(matches!(repo.delete("P2").await, Err(AppError::NotFound)));
        assert!(matches!(
            repo.update(product("missing", 1)).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn failed_modification_writes_nothing() {
        let store = store();
        let repo = store.repo::<Product>();
        repo.create(product("P1", 2)).await.unwrap();

        let result: AppResult<()> = repo
            .modify(|items| {
                items.clear();
                Err(AppError::validation("nope"))
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.load().await, vec![product("P1", 2)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_modifications_keep_every_write() {
        let store = Arc::new(store());
        let mut tasks = Vec::new();
        for n in 0..24 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .repo::<Product>()
                    .modify(|items| {
                        items.push(product(&format!("P{n}"), n));
                        Ok(())
                    })
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.repo::<Product>().load().await.len(), 24);
    }

    #[tokio::test]
    async fn remote_read_failure_serves_local_snapshot() {
        let store = store();
        let repo = store.repo::<Product>();
        repo.modify(|items| {
            items.push(product("P1", 4));
            Ok(())
        })
        .await
        .unwrap();

        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".into())])
            .into_connection();
        store.attach_remote(RemoteStore::new(conn), "postgres://localhost/shop");

        let snapshot = repo.load_snapshot().await;
        assert!(snapshot.degraded);
        assert_eq!(snapshot.items, vec![product("P1", 4)]);
    }

    #[tokio::test]
    async fn remote_write_failure_is_reported_and_not_redirected() {
        let store = store();
        let repo = store.repo::<Product>();

        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("timeout".into())])
            .into_connection();
        store.attach_remote(RemoteStore::new(conn), "postgres://localhost/shop");

        let result = repo.create(product("P9", 1)).await;
        assert!(matches!(result, Err(AppError::Remote(_))));

        let local: Vec<Product> = store.local().load(keys::PRODUCTS).await;
        assert!(local.is_empty());
    }

    #[tokio::test]
    async fn remote_read_refreshes_local_snapshot() {
        let store = store();
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("id", sea_orm::Value::from("P7")),
                ("name", sea_orm::Value::from("Denim Jacket")),
                ("price", sea_orm::Value::Double(Some(1299.0))),
                ("stock", sea_orm::Value::Int(Some(6))),
            ])]])
            .into_connection();
        store.attach_remote(RemoteStore::new(conn), "postgres://localhost/shop");

        let snapshot = store.repo::<Product>().load_snapshot().await;
        assert!(!snapshot.degraded);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].price, dec!(1299));
        assert_eq!(snapshot.items[0].category, "");

        let local: Vec<Product> = store.local().load(keys::PRODUCTS).await;
        assert_eq!(local, snapshot.items);
    }

    #[tokio::test]
    async fn local_only_collections_ignore_remote_mode() {
        let store = store();
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        store.attach_remote(RemoteStore::new(conn), "postgres://localhost/shop");

        let note = Notification {
            id: "N1".into(),
            title: "New stock request".into(),
            message: "reseller1 asked for 5 units".into(),
            target_role: Some(crate::models::Role::HeadAdmin),
            specific_user: None,
            created_at: chrono::Utc::now(),
            read: false,
        };
        store.repo::<Notification>().create(note.clone()).await.unwrap();
        assert_eq!(store.repo::<Notification>().load().await, vec![note]);
    }
}
