//! Mystery card spending: the mystery-effect endpoint and the steal-power shortcut.

use tracing::info;

use crate::{
    dto::admin::{MysteryEffectRequest, MysteryEffectResponse, StealPowerRequest},
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        mystery::{EffectKind, MysteryEffect},
    },
};

/// Spend one card from the owner and apply the requested effect.
pub async fn apply_mystery_effect(
    state: &SharedState,
    request: MysteryEffectRequest,
) -> Result<MysteryEffectResponse, ServiceError> {
    let effect = MysteryEffect::from_parts(request.effect, request.target_team, request.points)?;
    resolve(state, &request.owner_team, effect).await
}

/// Steal points with a mystery card. Shares the policy of [`apply_mystery_effect`].
pub async fn steal_power(
    state: &SharedState,
    request: StealPowerRequest,
) -> Result<MysteryEffectResponse, ServiceError> {
    let effect = MysteryEffect::Steal {
        target: request.target_team,
        points: request.points_to_steal,
    };
    resolve(state, &request.stealing_team, effect).await
}

async fn resolve(
    state: &SharedState,
    owner: &str,
    effect: MysteryEffect,
) -> Result<MysteryEffectResponse, ServiceError> {
    let response = state
        .run_command_then(
            |house| {
                house
                    .apply_mystery_effect(owner, effect)
                    .map(MysteryEffectResponse::from)
            },
            |house, response| {
                sse_events::broadcast_display(state, house);
                if let (EffectKind::Steal, Some(target)) = (response.effect, &response.target_team)
                {
                    sse_events::broadcast_points_stolen(
                        state,
                        &response.owner_team,
                        target,
                        response.points,
                    );
                }
                sse_events::broadcast_mystery_effect_applied(state, response);
            },
        )
        .await?;
    info!(
        owner = %response.owner_team,
        effect = ?response.effect,
        target = ?response.target_team,
        points = response.points,
        "mystery effect applied"
    );
    Ok(response)
}
