use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        admin::{EventEndResponse, MysteryEffectResponse},
        display::{DisplaySnapshot, LeaderboardToggleEvent, sorted_teams},
        product::{Audience, ProductView},
        sse::{
            MysteryCardAwardedEvent, MysteryEffectAppliedEvent, MysteryRevealedEvent,
            PointsStolenEvent, ProductSoldEvent, ServerEvent, StealPowerAwardedEvent,
            SystemStatus,
        },
        team::TeamSummary,
    },
    state::{
        AppState,
        auction::{AuctionHouse, Reward, SaleOutcome},
        catalog::Product,
    },
};

pub const EVENT_DISPLAY_UPDATE: &str = "displayUpdate";
pub const EVENT_TEAMS_UPDATE: &str = "teamsUpdate";
const EVENT_PRODUCT_LIVE: &str = "productLive";
const EVENT_PRODUCT_UPDATED: &str = "productUpdated";
const EVENT_PRODUCT_SOLD: &str = "productSold";
const EVENT_MYSTERY_REVEALED: &str = "mysteryRevealed";
const EVENT_MYSTERY_CARD_AWARDED: &str = "mysteryCardAwarded";
const EVENT_STEAL_POWER_AWARDED: &str = "stealPowerAwarded";
const EVENT_POINTS_STOLEN: &str = "pointsStolen";
const EVENT_MYSTERY_EFFECT_APPLIED: &str = "mysteryEffectApplied";
const EVENT_LEADERBOARD_TOGGLE: &str = "leaderboardToggle";
const EVENT_EVENT_ENDED: &str = "eventEnded";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Recompute the display snapshot and the sorted team list from `house`, then
/// push both to every subscriber. Runs under the command gate after each
/// committed mutation.
pub fn broadcast_display(state: &AppState, house: &AuctionHouse) {
    let visible = state.leaderboard_visible();
    let public = DisplaySnapshot::build(house, visible, Audience::Public);
    let admin = DisplaySnapshot::build(house, visible, Audience::Admin);

    send_public_event(state, EVENT_DISPLAY_UPDATE, &public);
    send_admin_event(state, EVENT_DISPLAY_UPDATE, &admin);
    send_all(state, EVENT_TEAMS_UPDATE, &sorted_teams(house));
}

/// Build the `displayUpdate` event a newly connected client starts from.
pub fn display_snapshot_event(
    state: &AppState,
    house: &AuctionHouse,
    audience: Audience,
) -> Option<ServerEvent> {
    let snapshot = DisplaySnapshot::build(house, state.leaderboard_visible(), audience);
    match ServerEvent::json(Some(EVENT_DISPLAY_UPDATE.to_string()), &snapshot) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize display snapshot");
            None
        }
    }
}

/// Announce the product opened for bidding.
pub fn broadcast_product_live(state: &AppState, product: &Product) {
    send_projected(state, EVENT_PRODUCT_LIVE, product);
}

/// Announce an edited product.
pub fn broadcast_product_updated(state: &AppState, product: &Product) {
    send_projected(state, EVENT_PRODUCT_UPDATED, product);
}

/// Announce a sale and, depending on the reward, the card award and mystery reveal.
pub fn broadcast_sale(state: &AppState, outcome: &SaleOutcome) {
    let product = ProductView::full(&outcome.product);
    let (points_awarded, mystery_cards_awarded) = match outcome.reward {
        Reward::Points(points) => (points, 0),
        Reward::MysteryCard => (0, 1),
    };
    send_all(
        state,
        EVENT_PRODUCT_SOLD,
        &ProductSoldEvent {
            product: product.clone(),
            winner_team: outcome.winner.name.clone(),
            points_awarded,
            mystery_cards_awarded,
        },
    );

    if outcome.reward == Reward::MysteryCard {
        send_all(
            state,
            EVENT_MYSTERY_CARD_AWARDED,
            &MysteryCardAwardedEvent {
                team_name: outcome.winner.name.clone(),
                product: product.clone(),
                mystery_cards: outcome.winner.mystery_cards,
            },
        );
        send_all(
            state,
            EVENT_STEAL_POWER_AWARDED,
            &StealPowerAwardedEvent {
                team_name: outcome.winner.name.clone(),
                product: product.clone(),
            },
        );
    }

    if outcome.revealed {
        send_all(
            state,
            EVENT_MYSTERY_REVEALED,
            &MysteryRevealedEvent {
                product,
                winner_team: outcome.winner.name.clone(),
            },
        );
    }
}

/// Announce points moved by a steal.
pub fn broadcast_points_stolen(state: &AppState, stealing: &str, target: &str, points: u32) {
    send_all(
        state,
        EVENT_POINTS_STOLEN,
        &PointsStolenEvent {
            stealing_team: stealing.to_owned(),
            target_team: target.to_owned(),
            points_stolen: points,
        },
    );
}

/// Announce any resolved mystery effect.
pub fn broadcast_mystery_effect_applied(state: &AppState, response: &MysteryEffectResponse) {
    send_all(
        state,
        EVENT_MYSTERY_EFFECT_APPLIED,
        &MysteryEffectAppliedEvent(response.clone()),
    );
}

pub fn broadcast_leaderboard_toggle(state: &AppState, show: bool, teams: Vec<TeamSummary>) {
    send_all(
        state,
        EVENT_LEADERBOARD_TOGGLE,
        &LeaderboardToggleEvent { show, teams },
    );
}

pub fn broadcast_event_ended(state: &AppState, standings: &EventEndResponse) {
    send_all(state, EVENT_EVENT_ENDED, standings);
}

/// Let every client know the backend entered or left degraded mode.
pub fn broadcast_system_status(state: &AppState, degraded: bool) {
    send_all(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Send a product to each stream using that stream's projection.
fn send_projected(state: &AppState, event: &str, product: &Product) {
    send_public_event(
        state,
        event,
        &ProductView::for_audience(product, Audience::Public),
    );
    send_admin_event(state, event, &ProductView::full(product));
}

fn send_all(state: &AppState, event: &str, payload: &impl Serialize) {
    send_public_event(state, event, payload);
    send_admin_event(state, event, payload);
}

fn send_public_event(state: &AppState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

fn send_admin_event(state: &AppState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.admin_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize admin SSE payload"),
    }
}
