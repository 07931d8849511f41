use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        admin::{ActionResponse, EventEndResponse},
        display::{DisplaySnapshot, LeaderboardRequest},
        product::Audience,
    },
    routes::admin::admin_only,
    services::event_service,
    state::SharedState,
};

/// Display snapshot for everyone; overlay and event end for the admin.
pub fn router(state: SharedState) -> Router<SharedState> {
    let admin = admin_only(
        state,
        Router::new()
            .route("/api/display/leaderboard", post(toggle_leaderboard))
            .route("/api/event/end", post(end_event)),
    );

    Router::new()
        .route("/api/display/state", get(display_state))
        .merge(admin)
}

/// Latest display snapshot, with unsold mysteries concealed.
#[utoipa::path(
    get,
    path = "/api/display/state",
    tag = "display",
    responses((status = 200, description = "Display snapshot", body = DisplaySnapshot))
)]
pub async fn display_state(State(state): State<SharedState>) -> Json<DisplaySnapshot> {
    let visible = state.leaderboard_visible();
    Json(
        state
            .read_house(|house| DisplaySnapshot::build(house, visible, Audience::Public))
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/api/display/leaderboard",
    tag = "display",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body = LeaderboardRequest,
    responses((status = 200, description = "Overlay toggled", body = ActionResponse))
)]
pub async fn toggle_leaderboard(
    State(state): State<SharedState>,
    Json(payload): Json<LeaderboardRequest>,
) -> Json<ActionResponse> {
    event_service::toggle_leaderboard(&state, payload.show).await;
    let message = if payload.show {
        "Leaderboard shown"
    } else {
        "Leaderboard hidden"
    };
    Json(ActionResponse::new(message))
}

/// Announce the winner and the final standings.
#[utoipa::path(
    post,
    path = "/api/event/end",
    tag = "display",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    responses((status = 200, description = "Final standings", body = EventEndResponse))
)]
pub async fn end_event(State(state): State<SharedState>) -> Json<EventEndResponse> {
    Json(event_service::end_event(&state).await)
}
