use serde::Serialize;
use utoipa::ToSchema;

/// Whether mutations are currently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage reachable; every command is served.
    Ok,
    /// Storage unreachable; reads only.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Display and player sockets currently connected.
    pub viewers: usize,
}

impl HealthResponse {
    pub fn new(degraded: bool, viewers: usize) -> Self {
        let status = if degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        Self { status, viewers }
    }
}
