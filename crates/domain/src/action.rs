//! Submitted player intents and the reactions they provoke.

use serde::{Deserialize, Serialize};

use crate::cards::Role;
use crate::ids::UserId;

/// A tagged-variant action a player may submit during `P1_action`.
///
/// Deep inheritance between action "cogs" in naive ports is collapsed
/// here to one explicit sum type dispatched on by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Income,
    ForeignAid,
    Tax,
    Steal { target: UserId },
    Assassinate { target: UserId, upgrade: bool },
    Coup { target: UserId },
    Swap { upgrade: bool },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Income => ActionKind::Income,
            Action::ForeignAid => ActionKind::ForeignAid,
            Action::Tax => ActionKind::Tax,
            Action::Steal { .. } => ActionKind::Steal,
            Action::Assassinate { .. } => ActionKind::Assassinate,
            Action::Coup { .. } => ActionKind::Coup,
            Action::Swap { .. } => ActionKind::Swap,
        }
    }

    pub fn target(&self) -> Option<&UserId> {
        match self {
            Action::Steal { target } | Action::Coup { target } => Some(target),
            Action::Assassinate { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Base coin cost, charged even if the action is later blocked.
    pub fn coin_cost(&self) -> u32 {
        match self {
            Action::Assassinate { .. } => 3,
            Action::Coup { .. } => 7,
            _ => 0,
        }
    }

    /// The role a player must claim to attempt this action (bluffable).
    /// `None` means the action requires no claim and cannot be challenged.
    pub fn claimed_role(&self) -> Option<Role> {
        match self {
            Action::Tax => Some(Role::Duke),
            Action::Steal { .. } => Some(Role::Captain),
            Action::Assassinate { .. } => Some(Role::Assassin),
            Action::Swap { .. } => Some(Role::Ambassador),
            Action::Income | Action::ForeignAid | Action::Coup { .. } => None,
        }
    }

    /// Whether the action may be challenged at all.
    pub fn is_challengeable(&self) -> bool {
        self.claimed_role().is_some()
    }

    /// Whether the action may be blocked, and if so by which claimed roles.
    pub fn blockable_by(&self) -> &'static [Role] {
        match self {
            Action::ForeignAid => &[Role::Duke],
            Action::Steal { .. } => &[Role::Captain, Role::Ambassador],
            Action::Assassinate { .. } => &[Role::Contessa],
            _ => &[],
        }
    }
}

/// Non-targeted, targeted variants share the same kind tag for display
/// and for the action-visibility surface (other players see the kind,
/// never the upgrade details).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Income,
    ForeignAid,
    Tax,
    Steal,
    Assassinate,
    Coup,
    Swap,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionKind::Income => "income",
            ActionKind::ForeignAid => "foreign_aid",
            ActionKind::Tax => "tax",
            ActionKind::Steal => "steal",
            ActionKind::Assassinate => "assassinate",
            ActionKind::Coup => "coup",
            ActionKind::Swap => "swap",
        };
        write!(f, "{s}")
    }
}

/// A player's response to another player's pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Challenge,
    Block,
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Monotonic insertion id; the resolver's tie-break key.
    pub id: crate::ids::ReactionId,
    pub session_id: crate::ids::SessionId,
    pub turn_number: u32,
    pub reactor_user_id: UserId,
    pub actor_user_id: UserId,
    pub target_action: ActionKind,
    pub kind: ReactionKind,
    pub block_with_role: Option<Role>,
    pub is_locked: bool,
    pub is_resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_challengeable_and_claims_duke() {
        assert_eq!(Action::Tax.claimed_role(), Some(Role::Duke));
        assert!(Action::Tax.is_challengeable());
    }

    #[test]
    fn income_is_never_challengeable_or_blockable() {
        assert_eq!(Action::Income.claimed_role(), None);
        assert!(Action::Income.blockable_by().is_empty());
    }

    #[test]
    fn coup_costs_seven_and_cannot_be_blocked() {
        assert_eq!(Action::Coup { target: UserId::from("bob") }.coin_cost(), 7);
        assert!(Action::Coup { target: UserId::from("bob") }.blockable_by().is_empty());
    }
}
