mod config;
mod connection;
mod error;
mod models;
pub mod store;

pub use config::{DEFAULT_DATABASE_NAME, MongoConfig};
pub use error::MongoDaoError;
pub use store::MongoAuctionStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable("mongodb", err.to_string(), err)
    }
}
