//! Shared preview/showcase countdown driven by a cancellable ticker task.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, interval_at},
};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::sse::SseState;
use crate::dto::sse::ServerEvent;

const TICK: Duration = Duration::from_secs(1);

/// Which countdown is running. Both share the single global slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CountdownKind {
    /// Product showcase before bidding.
    Showcase,
    /// Catalog preview with mystery products concealed.
    Preview,
}

impl CountdownKind {
    /// Event name announcing a new run.
    pub fn started_event(self) -> &'static str {
        match self {
            Self::Showcase => "showcaseStarted",
            Self::Preview => "previewStarted",
        }
    }

    /// Event name carrying the remaining seconds.
    pub fn timer_event(self) -> &'static str {
        match self {
            Self::Showcase => "showcaseTimerUpdate",
            Self::Preview => "previewTimerUpdate",
        }
    }

    /// Event name sent once the timer reaches zero.
    pub fn ended_event(self) -> &'static str {
        match self {
            Self::Showcase => "showcaseEnded",
            Self::Preview => "previewEnded",
        }
    }
}

/// Observable countdown state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountdownState {
    /// Whether a countdown is running.
    pub is_active: bool,
    /// Kind of the running countdown.
    pub kind: Option<CountdownKind>,
    /// Initial duration in seconds.
    pub duration: u32,
    /// Remaining seconds.
    pub timer: u32,
}

impl CountdownState {
    /// State of a run that just started.
    pub fn running(kind: CountdownKind, duration: u32) -> Self {
        Self {
            is_active: true,
            kind: Some(kind),
            duration,
            timer: duration,
        }
    }
}

struct Slot {
    current: CountdownState,
    run: u64,
    ticker: Option<JoinHandle<()>>,
}

/// Single global countdown. Starting a run preempts the previous one.
pub struct Countdown {
    slot: Arc<Mutex<Slot>>,
    hubs: SseState,
}

impl Countdown {
    /// Create an idle countdown broadcasting on `hubs`.
    pub fn new(hubs: SseState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                current: CountdownState::default(),
                run: 0,
                ticker: None,
            })),
            hubs,
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> CountdownState {
        self.slot.lock().await.current
    }

    /// Cancel any run, broadcast `started`, then tick once per second until zero.
    ///
    /// `duration` must be at least one second.
    pub async fn start(
        &self,
        kind: CountdownKind,
        duration: u32,
        started: ServerEvent,
    ) -> CountdownState {
        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.ticker.take() {
            previous.abort();
            info!(?kind, "preempting running countdown");
        }

        slot.run = slot.run.wrapping_add(1);
        slot.current = CountdownState::running(kind, duration);
        self.hubs.broadcast_all(started);

        let ticker = tokio::spawn(run_ticker(
            Arc::clone(&self.slot),
            self.hubs.clone(),
            slot.run,
            kind,
        ));
        slot.ticker = Some(ticker);
        info!(?kind, duration, "countdown started");
        slot.current
    }

    /// Cancel the ticker without broadcasting, leaving the countdown idle.
    pub async fn stop(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(ticker) = slot.ticker.take() {
            ticker.abort();
        }
        slot.run = slot.run.wrapping_add(1);
        slot.current = CountdownState::default();
    }
}

async fn run_ticker(slot: Arc<Mutex<Slot>>, hubs: SseState, run: u64, kind: CountdownKind) {
    let mut interval = interval_at(Instant::now() + TICK, TICK);
    loop {
        interval.tick().await;

        let mut guard = slot.lock().await;
        // A preempted ticker may still wake once before its abort lands.
        if guard.run != run {
            return;
        }

        guard.current.timer = guard.current.timer.saturating_sub(1);
        let remaining = guard.current.timer;
        send(&hubs, kind.timer_event(), &remaining);

        if remaining == 0 {
            guard.current = CountdownState::default();
            guard.ticker = None;
            send(&hubs, kind.ended_event(), &guard.current);
            info!(?kind, "countdown ended");
            return;
        }
    }
}

fn send(hubs: &SseState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hubs.broadcast_all(event),
        Err(err) => warn!(event, error = %err, "failed to serialize countdown payload"),
    }
}
