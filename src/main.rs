//! Bid Bazaar Back binary entrypoint wiring REST, WebSocket, SSE and the auction store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bid_bazaar_back::{
    config::AppConfig,
    dao::{auction_store::AuctionStore, storage::StorageError},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    tokio::fs::create_dir_all(config.upload_dir())
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir().display()))?;

    let app_state = AppState::new(config);

    tokio::spawn(storage_supervisor::run(app_state.clone(), connect_store));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown(app_state))
        .await
        .context("serving axum")?;

    Ok(())
}

#[cfg(feature = "mongo-store")]
async fn connect_store() -> Result<Arc<dyn AuctionStore>, StorageError> {
    use bid_bazaar_back::dao::auction_store::mongodb::{MongoAuctionStore, MongoConfig};

    let config = MongoConfig::from_env().await?;
    let store = MongoAuctionStore::connect(config).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo-store"))]
async fn connect_store() -> Result<Arc<dyn AuctionStore>, StorageError> {
    use bid_bazaar_back::dao::auction_store::memory::MemoryAuctionStore;

    warn!("built without mongo-store; records live in memory only");
    Ok(Arc::new(MemoryAuctionStore::new()))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for a stop signal, then halt the countdown and say goodbye to viewers.
async fn shutdown(state: SharedState) {
    shutdown_signal().await;
    info!("shutdown requested");
    state.countdown().stop().await;
    state.close_viewers();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
