use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::sse::ServerEvent;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from viewer WebSocket clients.
#[serde(tag = "type")]
pub enum ViewerInboundMessage {
    /// Ask for the latest display snapshot again.
    #[serde(rename = "sync")]
    Sync,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, ToSchema)]
/// Envelope pushed to viewers; mirrors an SSE event name and payload.
pub struct ViewerEnvelope {
    pub event: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl ViewerEnvelope {
    /// Wrap a broadcast event. Unnamed events are sent as `message`, and
    /// non-JSON data is forwarded as a string.
    pub fn from_event(event: &ServerEvent) -> Self {
        let data = serde_json::from_str(&event.data)
            .unwrap_or_else(|_| serde_json::Value::String(event.data.clone()));
        Self {
            event: event.event.clone().unwrap_or_else(|| "message".to_string()),
            data,
        }
    }
}
