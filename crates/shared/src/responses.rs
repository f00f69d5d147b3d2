//! Outbound REST response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coup_domain::{Action, ActionKind, ActionOutcome, Phase, Platform, ReactionKind, Role, SessionStatus};

/// Every 4xx/5xx body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub name: String,
    pub status: SessionStatus,
    pub current_phase: Option<Phase>,
    pub turn_number: u32,
    pub turn_limit: u32,
    pub max_players: u32,
    pub upgrades_enabled: bool,
    pub rematch_count: u32,
    pub winners: Vec<String>,
    pub discord_channel_id: Option<String>,
    pub slack_channel_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusView {
    #[serde(flatten)]
    pub session: SessionView,
    pub time_remaining_seconds: Option<i64>,
    pub last_turn_summary: Option<String>,
}

/// What every player is allowed to see about another player: never the
/// hand contents, just counts and the pending-action kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPublicView {
    pub display_name: String,
    pub coins: u32,
    pub is_alive: bool,
    pub hand_count: usize,
    pub pending_action: Option<ActionKind>,
    pub pending_target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPrivateView {
    #[serde(flatten)]
    pub public: PlayerPublicView,
    pub hand: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub session: SessionStatusView,
    pub players: Vec<PlayerPublicView>,
    pub you: Option<PlayerPrivateView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionView {
    pub reactor_display_name: String,
    pub actor_display_name: String,
    pub target_action: ActionKind,
    pub kind: ReactionKind,
    pub block_with_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResultView {
    pub actor_display_name: String,
    pub action: ActionKind,
    pub target_display_name: Option<String>,
    pub outcome: ActionOutcome,
    pub cards_revealed: Vec<Role>,
    pub coins_transferred: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResultView {
    pub turn_number: u32,
    pub actions: Vec<ActionResultView>,
    pub players_eliminated: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageView {
    pub id: i64,
    pub sender_display_name: String,
    pub platform: Platform,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelBindingView {
    pub session_id: String,
    pub channel_id: String,
}

/// Echoes the action the handler accepted, useful for client optimistic UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingActionAck {
    pub action: Action,
}
