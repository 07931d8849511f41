use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::{services::websocket_service, state::SharedState};

/// Display and player screens subscribe here; they get the public feed
/// wrapped in `{event, data}` envelopes and may send `{"type":"sync"}`.
#[utoipa::path(
    get,
    path = "/ws",
    tag = "viewers",
    responses((status = 101, description = "Upgraded to a viewer socket"))
)]
pub async fn viewer_socket(
    State(state): State<SharedState>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| websocket_service::handle_socket(state, socket))
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/ws", get(viewer_socket))
}
