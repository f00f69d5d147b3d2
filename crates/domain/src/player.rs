//! Per-session-per-user game state.

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind};
use crate::cards::Role;
use crate::ids::{SessionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Alive,
    Dead,
}

/// Action-kind-specific options a player may set alongside a pending
/// action (e.g. assassination_priority naming a preferred card to take
/// from the target). Upgrades are never exposed to other players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeFlags {
    /// For `Assassinate`: the target's role to remove first, if present.
    pub assassination_priority: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerGameState {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub display_name: String,
    pub coins: u32,
    pub debt: u32,
    /// Multiset of influence cards. 0-2 during normal play, up to 4
    /// transiently during swap resolution while the player holds both
    /// their old hand and two freshly drawn cards, before `resolve_swap`
    /// picks which two to keep.
    pub hand: Vec<Role>,
    pub status: PlayerStatus,
    pub pending_action: Option<Action>,
    pub upgrade_flags: Option<UpgradeFlags>,
    /// Monotonic join order; ties in the resolver are broken by this
    /// order, matching the order players joined the session.
    pub join_order: u32,
}

impl PlayerGameState {
    pub fn new(user_id: UserId, session_id: SessionId, display_name: String, join_order: u32) -> Self {
        Self {
            user_id,
            session_id,
            display_name,
            coins: 2,
            debt: 0,
            hand: Vec::new(),
            status: PlayerStatus::Alive,
            pending_action: None,
            upgrade_flags: None,
            join_order,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.status, PlayerStatus::Alive)
    }

    /// Invariant: `|hand| = 0 <=> dead`. Called after any influence
    /// loss; death is monotonic, never un-set here.
    pub fn mark_dead_if_out_of_influence(&mut self) {
        if self.hand.is_empty() {
            self.status = PlayerStatus::Dead;
        }
    }

    pub fn pending_action_kind(&self) -> Option<ActionKind> {
        self.pending_action.as_ref().map(Action::kind)
    }

    pub fn reset_for_rematch(&mut self) {
        self.coins = 2;
        self.debt = 0;
        self.hand.clear();
        self.status = PlayerStatus::Alive;
        self.pending_action = None;
        self.upgrade_flags = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerGameState {
        PlayerGameState::new(UserId::from("alice"), SessionId::new(), "Alice".into(), 0)
    }

    #[test]
    fn starts_with_two_coins_and_alive() {
        let p = player();
        assert_eq!(p.coins, 2);
        assert!(p.is_alive());
    }

    #[test]
    fn empty_hand_marks_dead() {
        let mut p = player();
        p.hand = vec![Role::Duke];
        p.hand.pop();
        p.mark_dead_if_out_of_influence();
        assert!(!p.is_alive());
    }

    #[test]
    fn nonempty_hand_stays_alive() {
        let mut p = player();
        p.hand = vec![Role::Duke];
        p.mark_dead_if_out_of_influence();
        assert!(p.is_alive());
    }
}
