use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::new(state.is_degraded(), state.viewers().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::health::HealthStatus,
        services::test_support::running_state,
        state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_without_store() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn reports_ok_once_store_is_installed() {
        let (state, _store) = running_state().await;
        let health = health_status(&state).await;
        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.viewers, 0);
    }
}
