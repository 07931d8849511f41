use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{
        product::{Audience, ProductView},
        team::TeamSummary,
    },
    state::auction::AuctionHouse,
};

/// Read-only projection pushed to the display after every mutation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    /// Product currently open for bidding.
    pub current_product: Option<ProductView>,
    /// Whole catalog in creation order.
    pub all_products: Vec<ProductView>,
    /// Teams ordered by points descending.
    pub teams: Vec<TeamSummary>,
    /// Whether the display shows the leaderboard overlay.
    pub leaderboard_visible: bool,
}

impl DisplaySnapshot {
    /// Compute the snapshot for `audience` from the auction house.
    pub fn build(house: &AuctionHouse, leaderboard_visible: bool, audience: Audience) -> Self {
        Self {
            current_product: house
                .catalog
                .current()
                .map(|product| ProductView::for_audience(product, audience)),
            all_products: house
                .catalog
                .iter()
                .map(|product| ProductView::for_audience(product, audience))
                .collect(),
            teams: sorted_teams(house),
            leaderboard_visible,
        }
    }
}

/// Teams ordered by points descending, ties by insertion order.
pub fn sorted_teams(house: &AuctionHouse) -> Vec<TeamSummary> {
    house
        .ledger
        .sorted()
        .into_iter()
        .map(TeamSummary::from)
        .collect()
}

/// Request toggling the leaderboard overlay.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaderboardRequest {
    pub show: bool,
}

/// Broadcast when the leaderboard overlay is shown or hidden.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardToggleEvent {
    pub show: bool,
    pub teams: Vec<TeamSummary>,
}
