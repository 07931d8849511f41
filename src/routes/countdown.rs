use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::admin::CountdownRequest,
    error::AppError,
    routes::admin::admin_only,
    services::countdown_service,
    state::{SharedState, countdown::CountdownState},
};

/// Countdown state for everyone; starting a run is admin only.
pub fn router(state: SharedState) -> Router<SharedState> {
    let admin = admin_only(
        state,
        Router::new()
            .route("/api/showcase/start", post(start_showcase))
            .route("/api/preview/start", post(start_preview)),
    );

    Router::new()
        .route("/api/showcase/state", get(countdown_state))
        .merge(admin)
}

/// Current countdown, shared by showcase and preview.
#[utoipa::path(
    get,
    path = "/api/showcase/state",
    tag = "countdown",
    responses((status = 200, description = "Countdown state", body = CountdownState))
)]
pub async fn countdown_state(State(state): State<SharedState>) -> Json<CountdownState> {
    Json(countdown_service::countdown_state(&state).await)
}

/// Start a showcase countdown, replacing any running one.
#[utoipa::path(
    post,
    path = "/api/showcase/start",
    tag = "countdown",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body = CountdownRequest,
    responses((status = 200, description = "Countdown started", body = CountdownState))
)]
pub async fn start_showcase(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CountdownRequest>>,
) -> Result<Json<CountdownState>, AppError> {
    Ok(Json(
        countdown_service::start_showcase(&state, payload.duration).await?,
    ))
}

/// Start a preview countdown, replacing any running one.
#[utoipa::path(
    post,
    path = "/api/preview/start",
    tag = "countdown",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body = CountdownRequest,
    responses((status = 200, description = "Countdown started", body = CountdownState))
)]
pub async fn start_preview(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CountdownRequest>>,
) -> Result<Json<CountdownState>, AppError> {
    Ok(Json(
        countdown_service::start_preview(&state, payload.duration).await?,
    ))
}
