use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Broadcast sub-state carved out from [`AppState`](super::AppState).
///
/// The public hub feeds the display and player views (mystery products
/// concealed); the admin hub receives the full data.
#[derive(Clone)]
pub struct SseState {
    public: SseHub,
    admin: SseHub,
}

impl SseState {
    /// Build both hubs with per-stream channel capacities.
    pub fn new(public_capacity: usize, admin_capacity: usize) -> Self {
        Self {
            public: SseHub::new(public_capacity),
            admin: SseHub::new(admin_capacity),
        }
    }

    /// Hub fanning out events to every viewer.
    pub fn public(&self) -> &SseHub {
        &self.public
    }

    /// Hub fanning out events to the admin console.
    pub fn admin(&self) -> &SseHub {
        &self.admin
    }

    /// Send the same event on both hubs.
    pub fn broadcast_all(&self, event: ServerEvent) {
        self.admin.broadcast(event.clone());
        self.public.broadcast(event);
    }
}

/// Simple broadcast hub wrapper used by the SSE and WebSocket services.
#[derive(Clone)]
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
