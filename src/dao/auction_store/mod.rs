pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{ProductEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for teams and products.
///
/// Writes are per record and idempotent: `save_*` upserts, `delete_*` is a
/// no-op when the record is already gone.
pub trait AuctionStore: Send + Sync {
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn delete_team(&self, name: String) -> BoxFuture<'static, StorageResult<()>>;
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    fn save_product(&self, product: ProductEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn delete_product(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    fn list_products(&self) -> BoxFuture<'static, StorageResult<Vec<ProductEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
