use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoProductDocument, MongoTeamDocument, product_filter, team_filter},
};
use crate::dao::{
    auction_store::AuctionStore,
    models::{ProductEntity, TeamEntity},
    storage::StorageResult,
};

pub const TEAM_COLLECTION_NAME: &str = "teams";
pub const PRODUCT_COLLECTION_NAME: &str = "products";

#[derive(Clone)]
pub struct MongoAuctionStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Keeps the connection pool alive alongside the database handle.
    _client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard._client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoAuctionStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState {
                _client: client,
                database,
            }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let team_index = IndexModel::builder()
            .keys(doc! {"team_name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("team_name_unique_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        self.team_collection()
            .await
            .create_index(team_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: TEAM_COLLECTION_NAME,
                index: "team_name",
                source,
            })?;

        let product_index = IndexModel::builder()
            .keys(doc! {"created_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("product_created_at_idx".to_owned()))
                    .build(),
            )
            .build();

        self.product_collection()
            .await
            .create_index(product_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PRODUCT_COLLECTION_NAME,
                index: "created_at",
                source,
            })?;

        Ok(())
    }

    async fn team_collection(&self) -> Collection<MongoTeamDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME)
    }

    async fn product_collection(&self) -> Collection<MongoProductDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoProductDocument>(PRODUCT_COLLECTION_NAME)
    }

    async fn save_team(&self, team: TeamEntity) -> MongoResult<()> {
        let name = team.name.clone();
        let document: MongoTeamDocument = team.into();
        self.team_collection()
            .await
            .replace_one(team_filter(&name), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveTeam { name, source })?;
        Ok(())
    }

    async fn delete_team(&self, name: String) -> MongoResult<()> {
        self.team_collection()
            .await
            .delete_one(team_filter(&name))
            .await
            .map_err(|source| MongoDaoError::DeleteTeam { name, source })?;
        Ok(())
    }

    async fn list_teams(&self) -> MongoResult<Vec<TeamEntity>> {
        let documents: Vec<MongoTeamDocument> = self
            .team_collection()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn save_product(&self, product: ProductEntity) -> MongoResult<()> {
        let id = product.id;
        let document: MongoProductDocument = product.into();
        self.product_collection()
            .await
            .replace_one(product_filter(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveProduct { id, source })?;
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> MongoResult<()> {
        self.product_collection()
            .await
            .delete_one(product_filter(id))
            .await
            .map_err(|source| MongoDaoError::DeleteProduct { id, source })?;
        Ok(())
    }

    async fn list_products(&self) -> MongoResult<Vec<ProductEntity>> {
        let documents: Vec<MongoProductDocument> = self
            .product_collection()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListProducts { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListProducts { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }
}

impl AuctionStore for MongoAuctionStore {
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_team(team).await.map_err(Into::into) })
    }

    fn delete_team(&self, name: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_team(name).await.map_err(Into::into) })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams().await.map_err(Into::into) })
    }

    fn save_product(&self, product: ProductEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_product(product).await.map_err(Into::into) })
    }

    fn delete_product(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_product(id).await.map_err(Into::into) })
    }

    fn list_products(&self) -> BoxFuture<'static, StorageResult<Vec<ProductEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_products().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
