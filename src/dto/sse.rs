use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{
        admin::MysteryEffectResponse,
        product::ProductView,
        team::TeamSummary,
    },
    state::countdown::CountdownState,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels and WebSocket viewers.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`public` or `admin`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a product has been sold.
pub struct ProductSoldEvent {
    pub product: ProductView,
    pub winner_team: String,
    /// Points credited to the winner; zero for mystery-card products.
    pub points_awarded: u32,
    /// Cards granted to the winner; one for mystery-card products.
    pub mystery_cards_awarded: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a mystery product is sold and its identity disclosed.
pub struct MysteryRevealedEvent {
    pub product: ProductView,
    pub winner_team: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a team wins a mystery card.
pub struct MysteryCardAwardedEvent {
    pub team_name: String,
    pub product: ProductView,
    /// Cards held by the team after the award.
    pub mystery_cards: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Companion of [`MysteryCardAwardedEvent`] kept for consoles listening for the
/// steal power name.
pub struct StealPowerAwardedEvent {
    pub team_name: String,
    pub product: ProductView,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast after a successful steal.
pub struct PointsStolenEvent {
    pub stealing_team: String,
    pub target_team: String,
    pub points_stolen: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast after any resolved mystery effect.
pub struct MysteryEffectAppliedEvent(pub MysteryEffectResponse);

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a preview countdown starts; the catalog follows the audience rules.
pub struct PreviewStartedEvent {
    pub preview_state: CountdownState,
    pub products: Vec<ProductView>,
}
