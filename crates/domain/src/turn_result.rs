//! The durable record of one resolved turn.

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::cards::Role;
use crate::ids::{SessionId, TurnResultId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Success,
    ChallengedWon,
    ChallengedLost,
    Blocked,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub actor: UserId,
    pub action: ActionKind,
    pub target: Option<UserId>,
    pub outcome: ActionOutcome,
    pub cards_revealed: Vec<Role>,
    pub coins_transferred: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub id: TurnResultId,
    pub session_id: SessionId,
    pub turn_number: u32,
    pub actions: Vec<ActionResult>,
    pub players_eliminated: Vec<UserId>,
    pub summary: String,
}

impl TurnResult {
    pub fn new(session_id: SessionId, turn_number: u32) -> Self {
        Self {
            id: TurnResultId::new(),
            session_id,
            turn_number,
            actions: Vec::new(),
            players_eliminated: Vec::new(),
            summary: String::new(),
        }
    }
}
