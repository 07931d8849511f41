//! Single-session admin authentication.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::admin::{LoginRequest, LoginResponse},
    error::ServiceError,
    state::SharedState,
};

/// Check the credentials and issue a fresh token. A new login replaces the
/// previous session.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<LoginResponse, ServiceError> {
    if !state
        .config()
        .check_admin(&request.username, &request.password)
    {
        warn!(username = %request.username, "rejected admin login");
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    }

    let token = Uuid::new_v4().simple().to_string();
    let replaced = state.admin_session().lock().await.replace(token.clone());
    if replaced.is_some() {
        info!("admin logged in; previous session revoked");
    } else {
        info!("admin logged in");
    }
    Ok(LoginResponse { token })
}

/// Drop the current session, if any.
pub async fn logout(state: &SharedState) {
    if state.admin_session().lock().await.take().is_some() {
        info!("admin logged out");
    }
}

/// Accept `provided` only if it matches the live session token.
pub async fn verify_token(state: &SharedState, provided: &str) -> Result<(), ServiceError> {
    let guard = state.admin_session().lock().await;
    match guard.as_deref() {
        Some(token) if token == provided => Ok(()),
        Some(_) => Err(ServiceError::Unauthorized("invalid admin token".into())),
        None => Err(ServiceError::Unauthorized("no admin session; log in first".into())),
    }
}
