use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    error::{MongoDaoError, MongoResult},
    store::{PRODUCT_COLLECTION_NAME, TEAM_COLLECTION_NAME},
};
use crate::{
    dao::models::{ProductEntity, TeamEntity},
    state::catalog::{ProductStatus, ProductType},
};

/// Team document; `team_name` carries a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    team_name: String,
    points: u32,
    #[serde(default)]
    mystery_cards: u32,
    #[serde(default)]
    products_won: Vec<String>,
    created_at: DateTime,
}

/// Product document keyed by the product id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoProductDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    description: String,
    image_url: String,
    base_money_price: u32,
    point_value: u32,
    #[serde(default)]
    status: ProductStatus,
    #[serde(default)]
    product_type: ProductType,
    #[serde(default)]
    is_mystery: bool,
    #[serde(default)]
    winner_team: Option<String>,
    created_at: DateTime,
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            team_name: value.name,
            points: value.points,
            mystery_cards: value.mystery_cards,
            products_won: value.won_products.iter().map(Uuid::to_string).collect(),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> MongoResult<Self> {
        let won_products = value
            .products_won
            .into_iter()
            .map(|id| parse_id(TEAM_COLLECTION_NAME, id))
            .collect::<MongoResult<Vec<_>>>()?;
        Ok(Self {
            name: value.team_name,
            points: value.points,
            mystery_cards: value.mystery_cards,
            won_products,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<ProductEntity> for MongoProductDocument {
    fn from(value: ProductEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            image_url: value.image_url,
            base_money_price: value.base_money_price,
            point_value: value.point_value,
            status: value.status,
            product_type: value.product_type,
            is_mystery: value.is_mystery,
            winner_team: value.winner_team,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoProductDocument> for ProductEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoProductDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(PRODUCT_COLLECTION_NAME, value.id)?,
            name: value.name,
            description: value.description,
            image_url: value.image_url,
            base_money_price: value.base_money_price,
            point_value: value.point_value,
            status: value.status,
            product_type: value.product_type,
            is_mystery: value.is_mystery,
            winner_team: value.winner_team,
            created_at: value.created_at.to_system_time(),
        })
    }
}

fn parse_id(collection: &'static str, id: String) -> MongoResult<Uuid> {
    Uuid::parse_str(&id).map_err(|source| MongoDaoError::CorruptId {
        collection,
        id,
        source,
    })
}

pub fn team_filter(name: &str) -> Document {
    doc! {"team_name": name}
}

pub fn product_filter(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
