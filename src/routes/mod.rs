use axum::Router;
use tower_http::services::ServeDir;

use crate::{services::upload_service::UPLOAD_URL_PREFIX, state::SharedState};

pub mod admin;
pub mod countdown;
pub mod display;
pub mod docs;
pub mod effects;
pub mod health;
pub mod products;
pub mod sse;
pub mod teams;
pub mod websocket;

/// Compose all route trees, wiring in shared state, uploaded images and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(admin::router(state.clone()))
        .merge(teams::router(state.clone()))
        .merge(products::router(state.clone()))
        .merge(effects::router(state.clone()))
        .merge(countdown::router(state.clone()))
        .merge(display::router(state.clone()));

    let docs_router = docs::router(state.clone());
    let uploads = ServeDir::new(state.config().upload_dir());

    api_router
        .merge(docs_router)
        .nest_service(UPLOAD_URL_PREFIX, uploads)
        .with_state(state)
}
