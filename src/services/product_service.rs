//! Product catalog management and the auction lifecycle transitions.

use std::cmp::Reverse;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::product::{ProductFields, ProductView},
    error::ServiceError,
    services::{
        sse_events,
        upload_service::{self, ImageUpload},
    },
    state::{SharedState, catalog::ProductStatus},
};

/// Every product, fully disclosed, newest first.
pub async fn list_products(state: &SharedState) -> Vec<ProductView> {
    let mut products = state
        .read_house(|house| {
            house
                .catalog
                .iter()
                .map(|product| (product.created_at, ProductView::full(product)))
                .collect::<Vec<_>>()
        })
        .await;
    products.sort_by_key(|(created_at, _)| Reverse(*created_at));
    products.into_iter().map(|(_, view)| view).collect()
}

/// Store the uploaded image and add a pending product.
pub async fn create_product(
    state: &SharedState,
    fields: ProductFields,
    image: Option<ImageUpload>,
) -> Result<ProductView, ServiceError> {
    let mut draft = fields.into_draft(None).map_err(ServiceError::InvalidInput)?;
    let image = image.ok_or_else(|| ServiceError::InvalidInput("`image` is required".into()))?;

    let config = state.config();
    let image_url = upload_service::store_image(config.upload_dir(), &image).await?;
    draft.image_url = Some(image_url.clone());

    let result = state
        .run_command_then(
            |house| house.catalog.insert(draft).map(ProductView::full),
            |house, _| sse_events::broadcast_display(state, house),
        )
        .await;
    let product = match result {
        Ok(product) => product,
        Err(err) => {
            upload_service::discard_image(config.upload_dir(), &image_url).await;
            return Err(err);
        }
    };
    info!(product = %product.id, name = %product.name, "product created");
    Ok(product)
}

/// Overwrite the editable fields of a product, replacing its image when one is sent.
pub async fn update_product(
    state: &SharedState,
    id: Uuid,
    fields: ProductFields,
    image: Option<ImageUpload>,
) -> Result<ProductView, ServiceError> {
    let mut draft = fields.into_draft(None).map_err(ServiceError::InvalidInput)?;
    let config = state.config();
    if let Some(image) = image {
        draft.image_url = Some(upload_service::store_image(config.upload_dir(), &image).await?);
    }
    let new_image = draft.image_url.clone();

    let result = state
        .run_command_then(
            |house| {
                let previous_image = house.catalog.get(id)?.image_url.clone();
                let product = house.catalog.update(id, draft)?.clone();
                Ok((product, previous_image))
            },
            |house, (product, _)| {
                sse_events::broadcast_display(state, house);
                sse_events::broadcast_product_updated(state, product);
            },
        )
        .await;
    let (product, previous_image) = match result {
        Ok(updated) => updated,
        Err(err) => {
            if let Some(url) = new_image {
                upload_service::discard_image(config.upload_dir(), &url).await;
            }
            return Err(err);
        }
    };
    if previous_image != product.image_url {
        upload_service::discard_image(config.upload_dir(), &previous_image).await;
    }
    info!(product = %id, "product updated");
    Ok(ProductView::full(&product))
}

/// Remove a product and its image.
pub async fn delete_product(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let removed = state
        .run_command_then(
            |house| house.catalog.remove(id),
            |house, _| sse_events::broadcast_display(state, house),
        )
        .await?;
    upload_service::discard_image(state.config().upload_dir(), &removed.image_url).await;
    info!(product = %id, "product deleted");
    Ok(())
}

/// Open a product for bidding; every other product goes back to pending.
pub async fn set_current(state: &SharedState, id: Uuid) -> Result<ProductView, ServiceError> {
    let product = state
        .run_command_then(
            |house| house.set_current(id).cloned(),
            |house, product| {
                sse_events::broadcast_display(state, house);
                sse_events::broadcast_product_live(state, product);
            },
        )
        .await?;
    info!(product = %id, "product is live");
    Ok(ProductView::full(&product))
}

/// Close a sale and route the reward to the winner.
pub async fn mark_sold(
    state: &SharedState,
    id: Uuid,
    winner: &str,
) -> Result<ProductView, ServiceError> {
    let (outcome, previous) = state
        .run_command_then(
            |house| {
                let previous = house.catalog.get(id)?.status;
                Ok((house.mark_sold(id, winner)?, previous))
            },
            |house, (outcome, _)| {
                sse_events::broadcast_display(state, house);
                sse_events::broadcast_sale(state, outcome);
            },
        )
        .await?;
    if previous != ProductStatus::Current {
        warn!(product = %id, status = ?previous, "sold a product that was not live");
    }
    info!(
        product = %id,
        winner = %winner,
        reward = ?outcome.reward,
        "product sold"
    );
    Ok(ProductView::full(&outcome.product))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::auction_store::AuctionStore,
        config::AppConfig,
        services::test_support::{
            drain_names, recv_named, running_state, running_state_with, seed_product, seed_team,
        },
        state::catalog::ProductType,
    };

    #[tokio::test]
    async fn set_current_keeps_a_single_live_product() {
        let (state, store) = running_state().await;
        let first = seed_product(&state, "P1", ProductType::Normal, false, 20).await;
        let second = seed_product(&state, "P2", ProductType::Normal, false, 20).await;

        set_current(&state, first).await.unwrap();
        set_current(&state, second).await.unwrap();

        let current: Vec<Uuid> = list_products(&state)
            .await
            .into_iter()
            .filter(|p| p.status == ProductStatus::Current)
            .map(|p| p.id)
            .collect();
        assert_eq!(current, vec![second]);

        let persisted = store.list_products().await.unwrap();
        let first_stored = persisted.iter().find(|p| p.id == first).unwrap();
        assert_eq!(first_stored.status, ProductStatus::Pending);
    }

    #[tokio::test]
    async fn set_current_on_missing_product_changes_nothing() {
        let (state, _store) = running_state().await;
        let live = seed_product(&state, "P1", ProductType::Normal, false, 20).await;
        set_current(&state, live).await.unwrap();

        let err = set_current(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let products = list_products(&state).await;
        assert_eq!(products[0].status, ProductStatus::Current);
    }

    #[tokio::test]
    async fn alpha_wins_p1_then_beta_wins_a_card() {
        let (state, _store) = running_state().await;
        seed_team(&state, "Alpha", 0, 0).await;
        seed_team(&state, "Beta", 0, 0).await;
        let p1 = seed_product(&state, "P1", ProductType::Normal, false, 50).await;
        let p2 = seed_product(&state, "P2", ProductType::MysteryCard, false, 99).await;

        set_current(&state, p1).await.unwrap();
        let sold = mark_sold(&state, p1, "Alpha").await.unwrap();
        assert_eq!(sold.status, ProductStatus::Sold);
        assert_eq!(sold.winner_team.as_deref(), Some("Alpha"));

        set_current(&state, p2).await.unwrap();
        mark_sold(&state, p2, "Beta").await.unwrap();

        let (alpha, beta) = state
            .read_house(|house| {
                (
                    house.ledger.get("Alpha").unwrap().clone(),
                    house.ledger.get("Beta").unwrap().clone(),
                )
            })
            .await;
        assert_eq!(alpha.points, 50);
        assert_eq!(alpha.won_products, vec![p1]);
        assert_eq!(beta.points, 0);
        assert_eq!(beta.mystery_cards, 1);
        assert!(beta.won_products.is_empty());
    }

    #[tokio::test]
    async fn selling_a_mystery_broadcasts_the_reveal() {
        let (state, _store) = running_state().await;
        seed_team(&state, "Alpha", 0, 0).await;
        let hidden = seed_product(&state, "Vault", ProductType::Normal, true, 10).await;
        let mut rx = state.public_sse().subscribe();

        mark_sold(&state, hidden, "Alpha").await.unwrap();

        let revealed = recv_named(&mut rx, "mysteryRevealed").await;
        assert_eq!(revealed["product"]["name"], "Vault");
        assert_eq!(revealed["winnerTeam"], "Alpha");
    }

    #[tokio::test]
    async fn mystery_card_sale_announces_the_award() {
        let (state, _store) = running_state().await;
        seed_team(&state, "Beta", 0, 0).await;
        let card = seed_product(&state, "Card", ProductType::MysteryCard, false, 0).await;
        let mut rx = state.public_sse().subscribe();

        mark_sold(&state, card, "Beta").await.unwrap();

        let names = drain_names(&mut rx);
        assert_eq!(
            names,
            vec![
                "displayUpdate",
                "teamsUpdate",
                "productSold",
                "mysteryCardAwarded",
                "stealPowerAwarded"
            ]
        );
    }

    #[tokio::test]
    async fn live_product_is_concealed_on_the_public_stream() {
        let (state, _store) = running_state().await;
        let hidden = seed_product(&state, "Vault", ProductType::Mystery, false, 10).await;
        let mut public = state.public_sse().subscribe();
        let mut admin = state.admin_sse().subscribe();

        set_current(&state, hidden).await.unwrap();

        let public_live = recv_named(&mut public, "productLive").await;
        assert_eq!(public_live["name"], crate::dto::product::CONCEALED_NAME);
        let admin_live = recv_named(&mut admin, "productLive").await;
        assert_eq!(admin_live["name"], "Vault");
    }

    #[tokio::test]
    async fn offline_store_leaves_the_sale_unapplied() {
        let (state, store) = running_state().await;
        seed_team(&state, "Alpha", 0, 0).await;
        let p1 = seed_product(&state, "P1", ProductType::Normal, false, 50).await;
        store.set_offline(true);

        let err = mark_sold(&state, p1, "Alpha").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let points = state
            .read_house(|house| house.ledger.get("Alpha").unwrap().points)
            .await;
        assert_eq!(points, 0);
    }

    #[tokio::test]
    async fn create_requires_an_image() {
        let (state, _store) = running_state().await;
        let mut fields = ProductFields::default();
        for (key, value) in [
            ("name", "Mug"),
            ("description", "Ceramic"),
            ("baseMoneyPrice", "10"),
            ("pointValue", "5"),
        ] {
            fields.set(key, value.into());
        }

        let err = create_product(&state, fields, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(list_products(&state).await.is_empty());
    }

    fn mug_fields() -> ProductFields {
        let mut fields = ProductFields::default();
        for (key, value) in [
            ("name", "Mug"),
            ("description", "Ceramic"),
            ("baseMoneyPrice", "10"),
            ("pointValue", "5"),
        ] {
            fields.set(key, value.into());
        }
        fields
    }

    fn upload(file_name: &str) -> ImageUpload {
        ImageUpload {
            file_name: file_name.into(),
            bytes: vec![7; 4],
        }
    }

    fn stored_path(dir: &std::path::Path, url: &str) -> std::path::PathBuf {
        dir.join(url.strip_prefix("/uploads/").unwrap())
    }

    #[tokio::test]
    async fn replaced_and_deleted_images_leave_the_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _store) =
            running_state_with(AppConfig::new("admin", "admin", dir.path())).await;

        let created = create_product(&state, mug_fields(), Some(upload("mug.png")))
            .await
            .unwrap();
        let original = stored_path(dir.path(), &created.image_url);
        assert!(original.exists());

        let updated = update_product(&state, created.id, mug_fields(), Some(upload("cup.png")))
            .await
            .unwrap();
        let replacement = stored_path(dir.path(), &updated.image_url);
        assert!(!original.exists());
        assert!(replacement.exists());

        update_product(&state, created.id, mug_fields(), None)
            .await
            .unwrap();
        assert!(replacement.exists());

        delete_product(&state, created.id).await.unwrap();
        assert!(!replacement.exists());
    }
}
