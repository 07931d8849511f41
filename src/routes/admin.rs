use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::admin::{ActionResponse, LoginRequest, LoginResponse},
    error::AppError,
    services::auth_service,
    state::SharedState,
};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Login and logout of the admin console.
pub fn router(state: SharedState) -> Router<SharedState> {
    let guarded = admin_only(state, Router::new().route("/admin/logout", post(logout)));

    Router::new().route("/admin/login", post(login)).merge(guarded)
}

/// Guard every route of `router` with [`require_admin_token`].
pub fn admin_only(state: SharedState, router: Router<SharedState>) -> Router<SharedState> {
    router.route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Exchange the admin credentials for a session token.
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(auth_service::login(&state, payload).await?))
}

/// Close the admin session.
#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    responses((status = 200, description = "Session closed", body = ActionResponse))
)]
pub async fn logout(State(state): State<SharedState>) -> Json<ActionResponse> {
    auth_service::logout(&state).await;
    Json(ActionResponse::new("logged out"))
}

/// Reject requests that do not carry the live session token.
pub async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    auth_service::verify_token(&state, &provided).await?;
    Ok(next.run(req).await)
}
