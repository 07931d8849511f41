use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save team `{name}`")]
    SaveTeam {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete team `{name}`")]
    DeleteTeam {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list teams")]
    ListTeams {
        #[source]
        source: MongoError,
    },
    #[error("failed to save product `{id}`")]
    SaveProduct {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete product `{id}`")]
    DeleteProduct {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list products")]
    ListProducts {
        #[source]
        source: MongoError,
    },
    #[error("corrupt document in `{collection}`: invalid id `{id}`")]
    CorruptId {
        collection: &'static str,
        id: String,
        #[source]
        source: uuid::Error,
    },
}
