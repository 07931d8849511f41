/// Admin login, logout and token checks.
pub mod auth_service;
/// Showcase and preview countdowns.
pub mod countdown_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Mystery card effects.
pub mod effect_service;
/// Event end and leaderboard overlay.
pub mod event_service;
/// Health check service.
pub mod health_service;
/// Catalog management and the auction lifecycle.
pub mod product_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
/// Team registration and lookup.
pub mod team_service;
/// Product image uploads.
pub mod upload_service;
/// WebSocket viewer handling.
pub mod websocket_service;

#[cfg(test)]
pub(crate) mod test_support;
