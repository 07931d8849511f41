//! Fixtures shared by the service tests.

use std::{sync::Arc, time::Duration};

use tokio::{sync::broadcast::Receiver, time::timeout};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::auction_store::memory::MemoryAuctionStore,
    dto::sse::ServerEvent,
    state::{
        AppState, SharedState,
        catalog::{ProductDraft, ProductType},
    },
};

/// State backed by a healthy in-memory store.
pub async fn running_state() -> (SharedState, MemoryAuctionStore) {
    running_state_with(AppConfig::default()).await
}

/// Same as [`running_state`] with a custom configuration.
pub async fn running_state_with(config: AppConfig) -> (SharedState, MemoryAuctionStore) {
    let state = AppState::new(config);
    let store = MemoryAuctionStore::new();
    state
        .install_store(Arc::new(store.clone()))
        .await
        .expect("memory store hydrates");
    (state, store)
}

/// Register a team and credit it.
pub async fn seed_team(state: &SharedState, name: &str, points: u32, cards: u32) {
    state
        .run_command(|house| {
            house.ledger.create_team(name)?;
            house.ledger.credit(name, points)?;
            for _ in 0..cards {
                house.ledger.grant_mystery_card(name)?;
            }
            Ok(())
        })
        .await
        .expect("team seeded");
}

/// Add a pending product without going through the upload path.
pub async fn seed_product(
    state: &SharedState,
    name: &str,
    product_type: ProductType,
    is_mystery: bool,
    point_value: u32,
) -> Uuid {
    let draft = ProductDraft {
        name: name.into(),
        description: format!("{name} description"),
        image_url: Some(format!("/uploads/{name}.png")),
        base_money_price: 100,
        point_value,
        product_type,
        is_mystery,
    };
    state
        .run_command(|house| house.catalog.insert(draft).map(|product| product.id))
        .await
        .expect("product seeded")
}

/// Wait for the next event called `name`, skipping the others.
pub async fn recv_named(rx: &mut Receiver<ServerEvent>, name: &str) -> serde_json::Value {
    let wait = async {
        loop {
            let event = rx.recv().await.expect("hub open");
            if event.event.as_deref() == Some(name) {
                return serde_json::from_str::<serde_json::Value>(&event.data)
                    .expect("json payload");
            }
        }
    };
    timeout(Duration::from_secs(30), wait)
        .await
        .unwrap_or_else(|_| panic!("no `{name}` event received"))
}

/// Names of every event already queued on `rx`.
pub fn drain_names(rx: &mut Receiver<ServerEvent>) -> Vec<String> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.event.unwrap_or_default());
    }
    names
}
