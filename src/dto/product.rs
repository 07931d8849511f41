//! Product projections and the multipart form accepted by the catalog routes.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    state::catalog::{Product, ProductDraft, ProductStatus, ProductType},
};

/// Name shown instead of a mystery product's real name until it is sold.
pub const CONCEALED_NAME: &str = "??? MYSTERY ???";
/// Description shown instead of a mystery product's real description until it is sold.
pub const CONCEALED_DESCRIPTION: &str = "Details will be revealed after sold";
/// Placeholder image served instead of a concealed mystery product's picture.
pub const CONCEALED_IMAGE_URL: &str = "/uploads/mystery-box.jpg";

/// Who is going to see a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Display and player views: unsold mystery products are concealed.
    Public,
    /// Admin console: everything is disclosed.
    Admin,
}

/// Product as sent over the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Omitted while a mystery product is concealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_money_price: Option<u32>,
    /// Omitted while a mystery product is concealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_value: Option<u32>,
    pub status: ProductStatus,
    pub product_type: ProductType,
    pub is_mystery: bool,
    pub winner_team: Option<String>,
    pub created_at: String,
}

impl ProductView {
    /// Project a product for the given audience.
    pub fn for_audience(product: &Product, audience: Audience) -> Self {
        let conceal = audience == Audience::Public && product.is_concealed();
        if conceal {
            Self {
                id: product.id,
                name: CONCEALED_NAME.to_owned(),
                description: CONCEALED_DESCRIPTION.to_owned(),
                image_url: CONCEALED_IMAGE_URL.to_owned(),
                base_money_price: None,
                point_value: None,
                status: product.status,
                product_type: product.product_type,
                is_mystery: true,
                winner_team: None,
                created_at: format_system_time(product.created_at),
            }
        } else {
            Self {
                id: product.id,
                name: product.name.clone(),
                description: product.description.clone(),
                image_url: product.image_url.clone(),
                base_money_price: Some(product.base_money_price),
                point_value: Some(product.point_value),
                status: product.status,
                product_type: product.product_type,
                is_mystery: product.is_mystery(),
                winner_team: product.winner_team.clone(),
                created_at: format_system_time(product.created_at),
            }
        }
    }

    /// Fully disclosed projection.
    pub fn full(product: &Product) -> Self {
        Self::for_audience(product, Audience::Admin)
    }
}

/// Multipart form accepted by `POST /api/products` and `PUT /api/products/{id}`.
///
/// Only used to document the request body; the route parses the parts itself.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct ProductUpload {
    name: String,
    description: String,
    base_money_price: u32,
    point_value: u32,
    /// `normal`, `mystery` or `mystery-card`; defaults to `normal`.
    product_type: Option<ProductType>,
    /// `"true"` marks the product as a mystery.
    is_mystery: Option<bool>,
    /// Image file; required on creation, optional on update.
    #[schema(value_type = Option<String>)]
    image: Option<Vec<u8>>,
}

/// Text fields collected from a product multipart form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_money_price: Option<String>,
    pub point_value: Option<String>,
    pub product_type: Option<String>,
    pub is_mystery: Option<String>,
}

impl ProductFields {
    /// Record one text part; unknown parts are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "baseMoneyPrice" => &mut self.base_money_price,
            "pointValue" => &mut self.point_value,
            "productType" => &mut self.product_type,
            "isMystery" => &mut self.is_mystery,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Validate the collected fields and build a catalog draft.
    pub fn into_draft(self, image_url: Option<String>) -> Result<ProductDraft, String> {
        let name = required_text(self.name, "name")?;
        let description = required_text(self.description, "description")?;
        let base_money_price = parse_amount(self.base_money_price, "baseMoneyPrice")?;
        let point_value = parse_amount(self.point_value, "pointValue")?;
        let product_type = match self.product_type.as_deref().map(str::trim) {
            None | Some("") | Some("normal") => ProductType::Normal,
            Some("mystery") => ProductType::Mystery,
            Some("mystery-card") => ProductType::MysteryCard,
            Some(other) => return Err(format!("unknown productType `{other}`")),
        };
        let is_mystery = self.is_mystery.as_deref().map(str::trim) == Some("true");

        Ok(ProductDraft {
            name,
            description,
            image_url,
            base_money_price,
            point_value,
            product_type,
            is_mystery,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("`{field}` is required"))
}

fn parse_amount(value: Option<String>, field: &str) -> Result<u32, String> {
    let raw = required_text(value, field)?;
    raw.parse::<u32>()
        .map_err(|_| format!("`{field}` must be a non-negative integer, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn product(product_type: ProductType, is_mystery: bool, status: ProductStatus) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Golden Mug".into(),
            description: "Shiny".into(),
            image_url: "/uploads/1-mug.png".into(),
            base_money_price: 300,
            point_value: 40,
            status,
            product_type,
            is_mystery,
            winner_team: (status == ProductStatus::Sold).then(|| "Alpha".to_string()),
            created_at: SystemTime::now(),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> ProductFields {
        let mut fields = ProductFields::default();
        for (key, value) in pairs {
            fields.set(key, value.to_string());
        }
        fields
    }

    #[test]
    fn public_view_conceals_unsold_mystery() {
        let hidden = product(ProductType::Mystery, false, ProductStatus::Current);
        let view = ProductView::for_audience(&hidden, Audience::Public);
        assert_eq!(view.name, CONCEALED_NAME);
        assert_eq!(view.description, CONCEALED_DESCRIPTION);
        assert_eq!(view.point_value, None);
        assert_eq!(view.base_money_price, None);
        assert_eq!(view.image_url, CONCEALED_IMAGE_URL);

        let admin = ProductView::for_audience(&hidden, Audience::Admin);
        assert_eq!(admin.name, "Golden Mug");
        assert_eq!(admin.image_url, hidden.image_url);
        assert_eq!(admin.point_value, Some(40));
    }

    #[test]
    fn sold_mystery_is_disclosed_to_everyone() {
        let sold = product(ProductType::Normal, true, ProductStatus::Sold);
        let view = ProductView::for_audience(&sold, Audience::Public);
        assert_eq!(view.name, "Golden Mug");
        assert_eq!(view.winner_team.as_deref(), Some("Alpha"));
    }

    #[test]
    fn concealed_view_omits_amounts_in_json() {
        let hidden = product(ProductType::Normal, true, ProductStatus::Pending);
        let json = serde_json::to_value(ProductView::for_audience(&hidden, Audience::Public))
            .unwrap();
        assert!(json.get("pointValue").is_none());
        assert_eq!(json["isMystery"], true);
        assert_eq!(json["productType"], "normal");
    }

    #[test]
    fn form_fields_build_a_draft() {
        let draft = fields(&[
            ("name", " Mug "),
            ("description", "Ceramic"),
            ("baseMoneyPrice", "250"),
            ("pointValue", "50"),
            ("productType", "mystery-card"),
            ("isMystery", "true"),
            ("ignored", "x"),
        ])
        .into_draft(Some("/uploads/1-mug.png".into()))
        .unwrap();

        assert_eq!(draft.name, "Mug");
        assert_eq!(draft.point_value, 50);
        assert_eq!(draft.product_type, ProductType::MysteryCard);
        assert!(draft.is_mystery);
    }

    #[test]
    fn form_fields_reject_bad_numbers_and_types() {
        let base = [("name", "Mug"), ("description", "Ceramic"), ("baseMoneyPrice", "250")];

        let mut negative = base.to_vec();
        negative.push(("pointValue", "-5"));
        assert!(fields(&negative).into_draft(None).is_err());

        let mut unknown = base.to_vec();
        unknown.extend([("pointValue", "5"), ("productType", "legendary")]);
        assert!(fields(&unknown).into_draft(None).is_err());

        let mut defaults = base.to_vec();
        defaults.push(("pointValue", "5"));
        let draft = fields(&defaults).into_draft(None).unwrap();
        assert_eq!(draft.product_type, ProductType::Normal);
        assert!(!draft.is_mystery);
    }
}
