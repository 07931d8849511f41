//! Showcase and preview countdowns.

use serde::Serialize;

use crate::{
    dto::{
        admin::MAX_COUNTDOWN_SECS,
        product::{Audience, ProductView},
        sse::{PreviewStartedEvent, ServerEvent},
    },
    error::ServiceError,
    state::{
        SharedState,
        countdown::{CountdownKind, CountdownState},
    },
};

/// Start (or restart) the showcase countdown.
pub async fn start_showcase(
    state: &SharedState,
    duration: u32,
) -> Result<CountdownState, ServiceError> {
    let kind = CountdownKind::Showcase;
    ensure_duration(duration)?;
    let started = event(kind, &CountdownState::running(kind, duration))?;
    Ok(state.countdown().start(kind, duration, started).await)
}

/// Start (or restart) the preview countdown. The started event carries the
/// catalog with unsold mysteries concealed.
pub async fn start_preview(
    state: &SharedState,
    duration: u32,
) -> Result<CountdownState, ServiceError> {
    let kind = CountdownKind::Preview;
    ensure_duration(duration)?;
    let products = state
        .read_house(|house| {
            house
                .catalog
                .iter()
                .map(|product| ProductView::for_audience(product, Audience::Public))
                .collect()
        })
        .await;
    let started = event(
        kind,
        &PreviewStartedEvent {
            preview_state: CountdownState::running(kind, duration),
            products,
        },
    )?;
    Ok(state.countdown().start(kind, duration, started).await)
}

pub async fn countdown_state(state: &SharedState) -> CountdownState {
    state.countdown().state().await
}

fn ensure_duration(duration: u32) -> Result<(), ServiceError> {
    if (1..=MAX_COUNTDOWN_SECS).contains(&duration) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "duration must be between 1 and {MAX_COUNTDOWN_SECS} seconds"
        )))
    }
}

fn event(kind: CountdownKind, payload: &impl Serialize) -> Result<ServerEvent, ServiceError> {
    ServerEvent::json(Some(kind.started_event().to_string()), payload)
        .map_err(|err| ServiceError::Internal(format!("cannot encode countdown event: {err}")))
}
