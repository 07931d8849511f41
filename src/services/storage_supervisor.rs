use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{auction_store::AuctionStore, storage::StorageError},
    services::sse_events,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the storage backend, hydrate the auction house from it, then
/// keep polling its health. While storage is unreachable the shared state
/// stays in degraded mode and mutations are refused.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn AuctionStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(backend = err.backend(), error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
        };

        if let Err(err) = state.install_store(store.clone()).await {
            warn!(error = %err, "failed to hydrate auction state from storage");
            sleep(delay).await;
            delay = (delay * 2).min(MAX_DELAY);
            continue;
        }
        info!("storage connection established; leaving degraded mode");
        sse_events::broadcast_system_status(&state, false);
        delay = INITIAL_DELAY;

        loop {
            match store.health_check().await {
                Ok(()) => {
                    if set_degraded(&state, false) {
                        info!("storage healthy again; leaving degraded mode");
                    }
                    sleep(HEALTH_POLL_INTERVAL).await;
                }
                Err(err) => {
                    warn!(error = %err, "storage health check failed");
                    if reconnect(&state, store.as_ref()).await {
                        set_degraded(&state, false);
                        sleep(HEALTH_POLL_INTERVAL).await;
                    } else {
                        warn!("exhausted storage reconnect attempts; staying in degraded mode");
                        break;
                    }
                }
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

async fn reconnect(state: &SharedState, store: &dyn AuctionStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    set_degraded(state, true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }
    false
}

/// Update the degraded flag and announce the change to every client.
fn set_degraded(state: &SharedState, degraded: bool) -> bool {
    let changed = state.update_degraded(degraded);
    if changed {
        sse_events::broadcast_system_status(state, degraded);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::auction_store::memory::MemoryAuctionStore,
        services::test_support::recv_named,
        state::AppState,
    };

    fn spawn_supervisor(
        state: &SharedState,
        store: &MemoryAuctionStore,
    ) -> tokio::task::JoinHandle<()> {
        let store = store.clone();
        tokio::spawn(run(state.clone(), move || {
            let store = store.clone();
            async move { Ok(Arc::new(store) as Arc<dyn AuctionStore>) }
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn leaves_degraded_mode_once_connected() {
        let state = AppState::new(AppConfig::default());
        let store = MemoryAuctionStore::new();
        let mut rx = state.public_sse().subscribe();
        assert!(state.is_degraded());

        let supervisor = spawn_supervisor(&state, &store);
        let status = recv_named(&mut rx, "system.status").await;

        assert_eq!(status["degraded"], false);
        assert!(!state.is_degraded());
        supervisor.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn outage_toggles_degraded_mode_and_back() {
        let state = AppState::new(AppConfig::default());
        let store = MemoryAuctionStore::new();
        let mut rx = state.public_sse().subscribe();
        let supervisor = spawn_supervisor(&state, &store);
        recv_named(&mut rx, "system.status").await;

        store.set_offline(true);
        let status = recv_named(&mut rx, "system.status").await;
        assert_eq!(status["degraded"], true);
        assert!(state.is_degraded());

        store.set_offline(false);
        let status = recv_named(&mut rx, "system.status").await;
        assert_eq!(status["degraded"], false);
        assert!(!state.is_degraded());
        supervisor.abort();
    }
}
