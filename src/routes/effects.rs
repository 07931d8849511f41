use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::admin::{MysteryEffectRequest, MysteryEffectResponse, StealPowerRequest},
    error::AppError,
    routes::admin::admin_only,
    services::effect_service,
    state::SharedState,
};

/// Mystery card spending; admin only.
pub fn router(state: SharedState) -> Router<SharedState> {
    admin_only(
        state,
        Router::new()
            .route("/api/mystery-effect", post(mystery_effect))
            .route("/api/steal-power", post(steal_power)),
    )
}

/// Spend one mystery card on a steal, deduct or double effect.
#[utoipa::path(
    post,
    path = "/api/mystery-effect",
    tag = "effects",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body = MysteryEffectRequest,
    responses(
        (status = 200, description = "Effect applied", body = MysteryEffectResponse),
        (status = 400, description = "No card, self target, missing target or insufficient balance"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn mystery_effect(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<MysteryEffectRequest>>,
) -> Result<Json<MysteryEffectResponse>, AppError> {
    Ok(Json(effect_service::apply_mystery_effect(&state, payload).await?))
}

/// Steal points using a mystery card. Same rules as the `steal` effect.
#[utoipa::path(
    post,
    path = "/api/steal-power",
    tag = "effects",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body = StealPowerRequest,
    responses(
        (status = 200, description = "Points stolen", body = MysteryEffectResponse),
        (status = 400, description = "No card, self target or insufficient balance"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn steal_power(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<StealPowerRequest>>,
) -> Result<Json<MysteryEffectResponse>, AppError> {
    Ok(Json(effect_service::steal_power(&state, payload).await?))
}
