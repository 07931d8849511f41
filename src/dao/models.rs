use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    catalog::{Product, ProductStatus, ProductType},
    ledger::Team,
};

/// Representation of a team stored in persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Unique, case-sensitive team name (primary key).
    pub name: String,
    /// Accumulated points.
    pub points: u32,
    /// Spendable mystery cards.
    pub mystery_cards: u32,
    /// Products won, in sale order.
    pub won_products: Vec<Uuid>,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Representation of a product stored in persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductEntity {
    /// Stable identifier.
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Reference to the uploaded image.
    pub image_url: String,
    pub base_money_price: u32,
    pub point_value: u32,
    pub status: ProductStatus,
    pub product_type: ProductType,
    pub is_mystery: bool,
    /// Set only while the product is sold.
    pub winner_team: Option<String>,
    /// Creation timestamp; decides catalog order.
    pub created_at: SystemTime,
}

impl From<Team> for TeamEntity {
    fn from(team: Team) -> Self {
        Self {
            name: team.name,
            points: team.points,
            mystery_cards: team.mystery_cards,
            won_products: team.won_products,
            created_at: team.created_at,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(entity: TeamEntity) -> Self {
        Self {
            name: entity.name,
            points: entity.points,
            mystery_cards: entity.mystery_cards,
            won_products: entity.won_products,
            created_at: entity.created_at,
        }
    }
}

impl From<Product> for ProductEntity {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            image_url: product.image_url,
            base_money_price: product.base_money_price,
            point_value: product.point_value,
            status: product.status,
            product_type: product.product_type,
            is_mystery: product.is_mystery,
            winner_team: product.winner_team,
            created_at: product.created_at,
        }
    }
}

impl From<ProductEntity> for Product {
    fn from(entity: ProductEntity) -> Self {
        // Records written before a reset may carry a stale winner.
        let winner_team = match entity.status {
            ProductStatus::Sold => entity.winner_team,
            ProductStatus::Pending | ProductStatus::Current => None,
        };
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            image_url: entity.image_url,
            base_money_price: entity.base_money_price,
            point_value: entity.point_value,
            status: entity.status,
            product_type: entity.product_type,
            is_mystery: entity.is_mystery,
            winner_team,
            created_at: entity.created_at,
        }
    }
}
