use std::convert::Infallible;

use axum::{
    Router,
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use tracing::info;

use crate::{
    error::AppError,
    routes::admin::ADMIN_TOKEN_HEADER,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

/// `EventSource` cannot set headers, so the admin stream also takes the token as a query parameter.
#[derive(Debug, Deserialize)]
pub struct AdminStreamQuery {
    token: Option<String>,
}

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream public events (mysteries concealed) to displays and players.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (initial, receiver) = sse_service::open_public(&state).await;
    info!("New public SSE connection");
    sse_service::to_sse_stream(initial, receiver, StreamKind::Public)
}

#[utoipa::path(
    get,
    path = "/sse/admin",
    tag = "sse",
    params(
        ("X-Admin-Token" = Option<String>, Header, description = "Admin token issued by /admin/login"),
        ("token" = Option<String>, Query, description = "Same token, for clients that cannot set headers")
    ),
    responses(
        (status = 200, description = "Admin SSE stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// Stream fully disclosed events to the admin console.
pub async fn admin_stream(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<AdminStreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let token = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or(query.token)
        .ok_or_else(|| AppError::Unauthorized("missing admin token".into()))?;

    let (initial, receiver) = sse_service::open_admin(&state, &token).await?;
    info!("New admin SSE connection");
    Ok(sse_service::to_sse_stream(initial, receiver, StreamKind::Admin))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/public", get(public_stream))
        .route("/sse/admin", get(admin_stream))
}
