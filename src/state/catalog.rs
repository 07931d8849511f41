//! Product catalog and product lifecycle status.

use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::AuctionError;

/// Lifecycle status of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Waiting to be auctioned.
    #[default]
    Pending,
    /// Open for bidding (a.k.a. live).
    Current,
    /// Sold to a winning team.
    Sold,
}

/// Controls how the reward of a product is routed on sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    /// Awards its point value.
    #[default]
    Normal,
    /// Awards its point value; identity hidden until sold.
    Mystery,
    /// Awards a mystery card instead of points.
    MysteryCard,
}

/// Product offered during the auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Reference to the uploaded image (e.g. `/uploads/1700000000000-mug.png`).
    pub image_url: String,
    /// Informational display price.
    pub base_money_price: u32,
    /// Points awarded to the winner.
    pub point_value: u32,
    /// Lifecycle status.
    pub status: ProductStatus,
    /// Reward routing type.
    pub product_type: ProductType,
    /// Explicit mystery flag, independent from [`ProductType::Mystery`].
    pub is_mystery: bool,
    /// Winning team; only set while the product is sold.
    pub winner_team: Option<String>,
    /// Creation timestamp; decides catalog order after a reload.
    pub created_at: SystemTime,
}

impl Product {
    /// Whether the product identity must stay hidden from players until sold.
    pub fn is_mystery(&self) -> bool {
        self.is_mystery || self.product_type == ProductType::Mystery
    }

    /// Whether the product details are currently concealed from players.
    pub fn is_concealed(&self) -> bool {
        self.is_mystery() && self.status != ProductStatus::Sold
    }
}

/// Editable product fields supplied by the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Image reference; `None` keeps the current image on update.
    pub image_url: Option<String>,
    /// Informational display price.
    pub base_money_price: u32,
    /// Points awarded to the winner.
    pub point_value: u32,
    /// Reward routing type.
    pub product_type: ProductType,
    /// Explicit mystery flag.
    pub is_mystery: bool,
}

/// Products keyed by identifier, kept in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: IndexMap<Uuid, Product>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from persisted products, ordering them by creation time.
    ///
    /// Records left inconsistent by an interrupted write are repaired: only the
    /// earliest `current` product stays current and a `sold` product without a
    /// winner goes back to pending.
    pub fn from_products(mut products: Vec<Product>) -> Self {
        products.sort_by_key(|product| product.created_at);
        let mut seen_current = false;
        for product in &mut products {
            match product.status {
                ProductStatus::Current if seen_current => {
                    warn!(product = %product.id, "demoting extra current product to pending");
                    product.status = ProductStatus::Pending;
                }
                ProductStatus::Current => seen_current = true,
                ProductStatus::Sold if product.winner_team.is_none() => {
                    warn!(product = %product.id, "sold product has no winner; back to pending");
                    product.status = ProductStatus::Pending;
                }
                ProductStatus::Sold | ProductStatus::Pending => {}
            }
        }
        Self {
            products: products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
        }
    }

    /// Insert a new pending product. The draft must carry an image reference.
    pub fn insert(&mut self, draft: ProductDraft) -> Result<&Product, AuctionError> {
        let image_url = draft
            .image_url
            .ok_or_else(|| AuctionError::InvalidProduct("a product requires an image".into()))?;
        let product = Product {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            image_url,
            base_money_price: draft.base_money_price,
            point_value: draft.point_value,
            status: ProductStatus::Pending,
            product_type: draft.product_type,
            is_mystery: draft.is_mystery,
            winner_team: None,
            created_at: SystemTime::now(),
        };
        let id = product.id;
        Ok(&*self.products.entry(id).or_insert(product))
    }

    /// Overwrite the editable fields of a product; status and winner are kept.
    pub fn update(&mut self, id: Uuid, draft: ProductDraft) -> Result<&Product, AuctionError> {
        let product = self.get_mut(id)?;
        product.name = draft.name;
        product.description = draft.description;
        if let Some(image_url) = draft.image_url {
            product.image_url = image_url;
        }
        product.base_money_price = draft.base_money_price;
        product.point_value = draft.point_value;
        product.product_type = draft.product_type;
        product.is_mystery = draft.is_mystery;
        Ok(&*product)
    }

    /// Delete a product regardless of its status.
    pub fn remove(&mut self, id: Uuid) -> Result<Product, AuctionError> {
        self.products
            .shift_remove(&id)
            .ok_or(AuctionError::ProductNotFound(id))
    }

    /// Look up a product.
    pub fn get(&self, id: Uuid) -> Result<&Product, AuctionError> {
        self.products.get(&id).ok_or(AuctionError::ProductNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Result<&mut Product, AuctionError> {
        self.products
            .get_mut(&id)
            .ok_or(AuctionError::ProductNotFound(id))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Product> {
        self.products.values_mut()
    }

    /// Iterate over products in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The product currently open for bidding, if any.
    pub fn current(&self) -> Option<&Product> {
        self.products
            .values()
            .find(|product| product.status == ProductStatus::Current)
    }
}
