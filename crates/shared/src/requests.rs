//! Inbound REST request bodies.

use serde::{Deserialize, Serialize};

use coup_domain::{ActionKind, PhaseDurations, ReactionKind, Role};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub max_players: u32,
    #[serde(default)]
    pub turn_limit: u32,
    #[serde(default)]
    pub upgrades_enabled: bool,
    #[serde(default)]
    pub durations: PhaseDurations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSessionConfigRequest {
    pub name: Option<String>,
    pub max_players: Option<u32>,
    pub turn_limit: Option<u32>,
    pub upgrades_enabled: Option<bool>,
    pub durations: Option<PhaseDurations>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindChannelRequest {
    pub channel_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRequestKind {
    Income,
    ForeignAid,
    Tax,
    Steal,
    Assassinate,
    Coup,
    Swap,
}

impl From<ActionRequestKind> for ActionKind {
    fn from(value: ActionRequestKind) -> Self {
        match value {
            ActionRequestKind::Income => ActionKind::Income,
            ActionRequestKind::ForeignAid => ActionKind::ForeignAid,
            ActionRequestKind::Tax => ActionKind::Tax,
            ActionRequestKind::Steal => ActionKind::Steal,
            ActionRequestKind::Assassinate => ActionKind::Assassinate,
            ActionRequestKind::Coup => ActionKind::Coup,
            ActionRequestKind::Swap => ActionKind::Swap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPendingActionRequest {
    pub action: ActionRequestKind,
    pub target_display_name: Option<String>,
    /// Present for parity with the wire contract; the server derives
    /// the claim from the action kind rather than trusting the client.
    pub claimed_role: Option<Role>,
    #[serde(default)]
    pub upgrade_enabled: bool,
    /// Only meaningful for `Assassinate` with `upgrade_enabled`.
    pub assassination_priority: Option<Role>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionRequestKind {
    Challenge,
    Block,
    Pass,
}

impl From<ReactionRequestKind> for ReactionKind {
    fn from(value: ReactionRequestKind) -> Self {
        match value {
            ReactionRequestKind::Challenge => ReactionKind::Challenge,
            ReactionRequestKind::Block => ReactionKind::Block,
            ReactionRequestKind::Pass => ReactionKind::Pass,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetReactionRequest {
    pub target_player: String,
    pub reaction_type: ReactionRequestKind,
    pub block_with_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinSessionRequest {
    pub display_name: String,
}

/// Submitted by whichever gateway relays the message (a Discord/Slack
/// bot, or the reasoning server on an LLM player's behalf) — the
/// sender's display name and originating platform are theirs to state,
/// not derivable from the caller's own identity header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendChatRequest {
    pub sender_display_name: String,
    pub platform: coup_domain::Platform,
    pub content: String,
}

/// Follow-up choice for the unresolved swap_influence 4-card hand: the
/// resolver already drew two replacement cards in, so the player picks
/// which two of the resulting four to keep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveSwapRequest {
    pub keep: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRematchRequest {
    #[serde(default = "default_true")]
    pub confirm: bool,
}
