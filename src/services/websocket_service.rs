use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{
    sync::{
        broadcast::{
            self,
            error::{RecvError, TryRecvError},
        },
        mpsc,
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        product::Audience,
        sse::ServerEvent,
        ws::{ViewerEnvelope, ViewerInboundMessage},
    },
    services::sse_events,
    state::{SharedState, ViewerConnection},
};

/// Handle the full lifecycle of a display or player WebSocket connection.
///
/// Viewers receive every public event wrapped in a `{event, data}` envelope,
/// starting with the latest display snapshot.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let viewer_id = Uuid::new_v4();
    let (events, snapshot) = state
        .announce(|house| {
            let events = state.public_sse().subscribe();
            let snapshot = sse_events::display_snapshot_event(&state, house, Audience::Public);
            (events, snapshot)
        })
        .await;
    state.viewers().insert(
        viewer_id,
        ViewerConnection {
            tx: outbound_tx.clone(),
        },
    );
    info!(id = %viewer_id, "viewer connected");

    if let Some(snapshot) = snapshot {
        forward(&outbound_tx, &snapshot);
    }
    let (sync_tx, sync_rx) = mpsc::unbounded_channel::<()>();
    let forwarder = tokio::spawn(forward_events(
        state.clone(),
        events,
        sync_rx,
        outbound_tx.clone(),
        viewer_id,
    ));

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ViewerInboundMessage>(&text) {
                Ok(ViewerInboundMessage::Sync) => {
                    let _ = sync_tx.send(());
                }
                Ok(ViewerInboundMessage::Unknown) => {
                    debug!(id = %viewer_id, payload = %text, "ignoring unknown viewer message");
                }
                Err(err) => {
                    warn!(id = %viewer_id, error = %err, "failed to parse viewer message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %viewer_id, "viewer closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %viewer_id, error = %err, "websocket error");
                break;
            }
        }
    }

    forwarder.abort();
    state.viewers().remove(&viewer_id);
    info!(id = %viewer_id, "viewer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Relay public events to one viewer and answer its `sync` requests.
///
/// A sync snapshot is built under the command gate after draining the events
/// already queued, so it never overtakes an older push.
async fn forward_events(
    state: SharedState,
    mut events: broadcast::Receiver<ServerEvent>,
    mut sync_requests: mpsc::UnboundedReceiver<()>,
    tx: mpsc::UnboundedSender<Message>,
    viewer_id: Uuid,
) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    if !forward(&tx, &event) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(id = %viewer_id, skipped, "viewer lagged behind the public stream");
                }
                Err(RecvError::Closed) => break,
            },
            request = sync_requests.recv() => {
                if request.is_none() {
                    break;
                }
                let batch = state
                    .announce(|house| {
                        let mut batch = drain_pending(&mut events);
                        batch.extend(sse_events::display_snapshot_event(
                            &state,
                            house,
                            Audience::Public,
                        ));
                        batch
                    })
                    .await;
                if !batch.iter().all(|event| forward(&tx, event)) {
                    break;
                }
            }
        }
    }
}

fn drain_pending(events: &mut broadcast::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut pending = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => pending.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return pending,
        }
    }
}

/// Queue one event for the viewer; `false` once the writer is gone.
fn forward(tx: &mpsc::UnboundedSender<Message>, event: &ServerEvent) -> bool {
    match envelope_message(event) {
        Some(message) => tx.send(message).is_ok(),
        None => true,
    }
}

/// Wrap a broadcast event into the text frame sent to viewers.
fn envelope_message(event: &ServerEvent) -> Option<Message> {
    match serde_json::to_string(&ViewerEnvelope::from_event(event)) {
        Ok(payload) => Some(Message::Text(payload.into())),
        Err(err) => {
            warn!(error = %err, "failed to serialize viewer envelope");
            None
        }
    }
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::running_state;

    #[test]
    fn envelope_message_is_a_text_frame() {
        let event = ServerEvent::json(Some("teamsUpdate".to_string()), &Vec::<u32>::new()).unwrap();
        let Some(Message::Text(text)) = envelope_message(&event) else {
            panic!("expected a text frame");
        };
        assert_eq!(text.as_str(), r#"{"event":"teamsUpdate","data":[]}"#);
    }

    #[tokio::test]
    async fn forwarder_wraps_public_events() {
        let (state, _store) = running_state().await;
        let (hub_tx, hub_rx) = broadcast::channel(4);
        let (_sync_tx, sync_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(forward_events(state, hub_rx, sync_rx, tx, Uuid::nil()));

        hub_tx
            .send(ServerEvent::json(Some("pointsStolen".to_string()), &1u32).unwrap())
            .unwrap();
        let Some(Message::Text(text)) = rx.recv().await else {
            panic!("expected a text frame");
        };
        assert!(text.as_str().starts_with(r#"{"event":"pointsStolen""#));

        drop(hub_tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn sync_snapshot_follows_queued_pushes() {
        let (state, _store) = running_state().await;
        let (hub_tx, hub_rx) = broadcast::channel(4);
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();

        hub_tx
            .send(ServerEvent::json(Some("teamsUpdate".to_string()), &Vec::<u32>::new()).unwrap())
            .unwrap();
        sync_tx.send(()).unwrap();
        let task = tokio::spawn(forward_events(state, hub_rx, sync_rx, tx, Uuid::nil()));

        let mut names = Vec::new();
        while names.len() < 2 {
            let Some(Message::Text(text)) = rx.recv().await else {
                panic!("expected a text frame");
            };
            let envelope: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            names.push(envelope["event"].as_str().unwrap().to_owned());
        }
        assert_eq!(names, vec!["teamsUpdate", "displayUpdate"]);

        drop(sync_tx);
        task.await.unwrap();
    }
}
