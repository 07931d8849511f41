pub mod auction;
pub mod catalog;
pub mod countdown;
pub mod error;
pub mod ledger;
pub mod mystery;
mod sse;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{auction_store::AuctionStore, storage::StorageResult},
    error::ServiceError,
    state::{
        auction::{AuctionHouse, ChangeSet},
        countdown::Countdown,
        error::AuctionError,
    },
};

pub use self::sse::{SseHub, SseState};

pub type SharedState = Arc<AppState>;
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
/// Handle used to push messages to a connected viewer.
pub struct ViewerConnection {
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state storing the auction model, connections and the store handle.
pub struct AppState {
    store: RwLock<Option<Arc<dyn AuctionStore>>>,
    sse: SseState,
    viewers: DashMap<Uuid, ViewerConnection>,
    house: RwLock<AuctionHouse>,
    countdown: Countdown,
    leaderboard_visible: AtomicBool,
    degraded: watch::Sender<bool>,
    command_gate: Mutex<()>,
    command_timeout: Option<Duration>,
    admin_session: Mutex<Option<String>>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let sse = SseState::new(64, 64);
        Arc::new(Self {
            store: RwLock::new(None),
            countdown: Countdown::new(sse.clone()),
            sse,
            viewers: DashMap::new(),
            house: RwLock::new(AuctionHouse::new()),
            leaderboard_visible: AtomicBool::new(false),
            degraded: degraded_tx,
            command_gate: Mutex::new(()),
            command_timeout: Some(DEFAULT_COMMAND_TIMEOUT),
            admin_session: Mutex::new(None),
            config: Arc::new(config),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn AuctionStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Return the installed store, or [`ServiceError::Degraded`] when writes are refused.
    pub async fn require_store(&self) -> Result<Arc<dyn AuctionStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store, hydrate the auction house from it and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn AuctionStore>) -> StorageResult<()> {
        let _gate = self.command_gate.lock().await;
        let teams = store.list_teams().await?;
        let products = store.list_products().await?;
        let house = AuctionHouse::from_records(
            teams.into_iter().map(Into::into).collect(),
            products.into_iter().map(Into::into).collect(),
        );
        debug!(
            teams = house.ledger.len(),
            products = house.catalog.len(),
            "hydrated auction house from storage"
        );

        *self.house.write().await = house;
        *self.store.write().await = Some(store);
        self.update_degraded(false);
        Ok(())
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, returning whether it changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Broadcast hub used for the public stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Broadcast hub used for the admin stream.
    pub fn admin_sse(&self) -> &SseHub {
        self.sse.admin()
    }

    /// Single admin session token issued on login.
    pub fn admin_session(&self) -> &Mutex<Option<String>> {
        &self.admin_session
    }

    /// Registry of connected WebSocket viewers.
    pub fn viewers(&self) -> &DashMap<Uuid, ViewerConnection> {
        &self.viewers
    }

    /// Shared preview/showcase countdown.
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Whether the display shows the leaderboard overlay.
    pub fn leaderboard_visible(&self) -> bool {
        self.leaderboard_visible.load(Ordering::SeqCst)
    }

    /// Record the leaderboard overlay flag.
    pub fn set_leaderboard_visible(&self, show: bool) {
        self.leaderboard_visible.store(show, Ordering::SeqCst);
    }

    /// Run a read-only closure against the committed auction house.
    pub async fn read_house<R>(&self, reader: impl FnOnce(&AuctionHouse) -> R) -> R {
        let guard = self.house.read().await;
        reader(&guard)
    }

    /// Run `announce` against the committed auction house while holding the
    /// command gate, so its pushes cannot interleave with a command's.
    pub async fn announce<R>(&self, announce: impl FnOnce(&AuctionHouse) -> R) -> R {
        let _gate = self.command_gate.lock().await;
        let house = self.house.read().await;
        announce(&house)
    }

    /// [`AppState::run_command_then`] without a post-commit announcement.
    pub async fn run_command<T, F>(&self, command: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut AuctionHouse) -> Result<T, AuctionError>,
    {
        self.run_command_then(command, |_, _| {}).await
    }

    /// Apply a command to a draft of the auction house, persist the records it
    /// touched, commit the draft, then call `announce` with the committed house.
    ///
    /// Commands are serialized by the command gate and `announce` still runs
    /// under it, so pushes leave in commit order. A failing command, a storage
    /// error or a timeout leaves the committed state untouched and announces
    /// nothing.
    pub async fn run_command_then<T, F, A>(
        &self,
        command: F,
        announce: A,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut AuctionHouse) -> Result<T, AuctionError>,
        A: FnOnce(&AuctionHouse, &T),
    {
        let _gate = self.command_gate.lock().await;
        let store = self.require_store().await?;

        let mut draft = self.house.read().await.clone();
        let value = command(&mut draft)?;
        let changes = {
            let committed = self.house.read().await;
            draft.changes_since(&committed)
        };

        if !changes.is_empty() {
            let persist = persist_changes(store, changes);
            match self.command_timeout {
                Some(limit) => match timeout(limit, persist).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(?limit, "persisting command timed out; draft discarded");
                        return Err(ServiceError::Timeout);
                    }
                },
                None => persist.await?,
            }
        }

        let mut house = self.house.write().await;
        *house = draft;
        let house = house.downgrade();
        announce(&house, &value);
        Ok(value)
    }

    /// Send a close frame to every connected viewer.
    pub fn close_viewers(&self) {
        for viewer in self.viewers.iter() {
            let _ = viewer.tx.send(Message::Close(None));
        }
    }
}

async fn persist_changes(store: Arc<dyn AuctionStore>, changes: ChangeSet) -> StorageResult<()> {
    let ChangeSet {
        upserted_teams,
        deleted_teams,
        upserted_products,
        deleted_products,
    } = changes;

    for team in upserted_teams {
        store.save_team(team.into()).await?;
    }
    for name in deleted_teams {
        store.delete_team(name).await?;
    }
    for product in upserted_products {
        store.save_product(product.into()).await?;
    }
    for id in deleted_products {
        store.delete_product(id).await?;
    }
    Ok(())
}
