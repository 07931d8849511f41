//! Volatile store used when no database is configured and by the test suite.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    auction_store::AuctionStore,
    models::{ProductEntity, TeamEntity},
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Error)]
#[error("in-memory store is offline")]
pub struct OfflineError;

#[derive(Clone, Default)]
pub struct MemoryAuctionStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    teams: RwLock<IndexMap<String, TeamEntity>>,
    products: RwLock<IndexMap<Uuid, ProductEntity>>,
    offline: AtomicBool,
}

impl MemoryInner {
    fn ensure_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("memory", "store is offline", OfflineError));
        }
        Ok(())
    }
}

impl MemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails until the store is brought back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }
}

impl AuctionStore for MemoryAuctionStore {
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.ensure_online()?;
            inner.teams.write().await.insert(team.name.clone(), team);
            Ok(())
        })
    }

    fn delete_team(&self, name: String) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.ensure_online()?;
            inner.teams.write().await.shift_remove(&name);
            Ok(())
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.teams.read().await.values().cloned().collect())
        })
    }

    fn save_product(&self, product: ProductEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.ensure_online()?;
            inner.products.write().await.insert(product.id, product);
            Ok(())
        })
    }

    fn delete_product(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.ensure_online()?;
            inner.products.write().await.shift_remove(&id);
            Ok(())
        })
    }

    fn list_products(&self) -> BoxFuture<'static, StorageResult<Vec<ProductEntity>>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.products.read().await.values().cloned().collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.ensure_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.ensure_online() })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn team(name: &str, points: u32) -> TeamEntity {
        TeamEntity {
            name: name.into(),
            points,
            mystery_cards: 0,
            won_products: Vec::new(),
            created_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn save_upserts_by_name() {
        let store = MemoryAuctionStore::new();
        store.save_team(team("Alpha", 0)).await.unwrap();
        store.save_team(team("Alpha", 50)).await.unwrap();

        let teams = store.list_teams().await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].points, 50);
    }

    #[tokio::test]
    async fn delete_missing_record_is_a_noop() {
        let store = MemoryAuctionStore::new();
        store.delete_team("Ghost".into()).await.unwrap();
        store.delete_product(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryAuctionStore::new();
        store.set_offline(true);
        assert!(store.health_check().await.is_err());
        assert!(store.save_team(team("Alpha", 0)).await.is_err());

        store.set_offline(false);
        assert!(store.try_reconnect().await.is_ok());
        assert!(store.list_teams().await.unwrap().is_empty());
    }
}
