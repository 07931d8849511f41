use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::{
    dto::{product::Audience, sse::Handshake, sse::ServerEvent},
    error::ServiceError,
    services::{auth_service, sse_events},
    state::{AppState, SharedState, auction::AuctionHouse},
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Identifies the target SSE stream for connection logging.
#[derive(Clone, Copy, Debug)]
pub enum StreamKind {
    Public,
    Admin,
}

impl StreamKind {
    fn name(self) -> &'static str {
        match self {
            StreamKind::Public => "public",
            StreamKind::Admin => "admin",
        }
    }

    fn audience(self) -> Audience {
        match self {
            StreamKind::Public => Audience::Public,
            StreamKind::Admin => Audience::Admin,
        }
    }
}

/// Subscribe to the public stream. The first events are the handshake and the
/// latest display snapshot; everything received afterwards is newer.
pub async fn open_public(
    state: &SharedState,
) -> (Vec<ServerEvent>, broadcast::Receiver<ServerEvent>) {
    state
        .announce(|house| {
            let receiver = state.public_sse().subscribe();
            (greeting(state, house, StreamKind::Public), receiver)
        })
        .await
}

/// Subscribe to the admin stream once `token` is verified.
pub async fn open_admin(
    state: &SharedState,
    token: &str,
) -> Result<(Vec<ServerEvent>, broadcast::Receiver<ServerEvent>), ServiceError> {
    auth_service::verify_token(state, token).await?;
    Ok(state
        .announce(|house| {
            let receiver = state.admin_sse().subscribe();
            (greeting(state, house, StreamKind::Admin), receiver)
        })
        .await)
}

fn greeting(state: &AppState, house: &AuctionHouse, kind: StreamKind) -> Vec<ServerEvent> {
    let handshake = Handshake {
        stream: kind.name().to_string(),
        message: format!("{} stream connected", kind.name()),
        degraded: state.is_degraded(),
    };
    let mut events = Vec::with_capacity(2);
    match ServerEvent::json(Some(EVENT_HANDSHAKE.to_string()), &handshake) {
        Ok(event) => events.push(event),
        Err(err) => warn!(error = %err, "failed to serialize SSE handshake"),
    }
    events.extend(sse_events::display_snapshot_event(state, house, kind.audience()));
    events
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

/// Convert a broadcast receiver into an SSE response, sending `initial` first
/// and forwarding events until the client disconnects.
pub fn to_sse_stream(
    initial: Vec<ServerEvent>,
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(stream = kind.name(), skipped, "SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(stream = kind.name(), "SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{auth_service, test_support::running_state};

    #[tokio::test]
    async fn public_greeting_is_handshake_then_snapshot() {
        let (state, _store) = running_state().await;
        let (initial, _rx) = open_public(&state).await;

        let names: Vec<_> = initial.iter().map(|e| e.event.clone().unwrap()).collect();
        assert_eq!(names, vec!["handshake", "displayUpdate"]);
        let handshake: serde_json::Value = serde_json::from_str(&initial[0].data).unwrap();
        assert_eq!(handshake["stream"], "public");
        assert_eq!(handshake["degraded"], false);
    }

    #[tokio::test]
    async fn admin_stream_requires_the_session_token() {
        let (state, _store) = running_state().await;
        assert!(matches!(
            open_admin(&state, "nope").await,
            Err(ServiceError::Unauthorized(_))
        ));

        let login = auth_service::login(
            &state,
            crate::dto::admin::LoginRequest {
                username: "admin".into(),
                password: "admin".into(),
            },
        )
        .await
        .unwrap();
        assert!(open_admin(&state, &login.token).await.is_ok());
    }
}
