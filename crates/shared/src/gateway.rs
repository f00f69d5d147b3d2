//! Outbound push contracts consumed by chat gateways and the reasoning
//! server. Those processes live outside this workspace; this module
//! only pins the wire shape the core sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coup_domain::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub id: i64,
    pub sender: String,
    pub platform: Platform,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of the at-least-once broadcast POST to a registered gateway
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayBroadcastPayload {
    pub session_id: String,
    pub broadcast_time: DateTime<Utc>,
    pub message_count: usize,
    pub messages: Vec<GatewayMessage>,
}

/// Body of the fire-and-forget push to the reasoning server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmEventPayload {
    pub event_type: String,
    pub source_platform: String,
    pub sender_id: String,
    pub sender_is_llm: bool,
    pub game_id: String,
    pub broadcast_to_all_agents: bool,
    pub payload: serde_json::Value,
}
