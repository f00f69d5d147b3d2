//! The six-phase turn cycle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    P1Action,
    Lockout1,
    P2Reaction,
    Lockout2,
    Broadcast,
    Ending,
}

impl Phase {
    /// The phase that follows this one in the fixed cycle
    /// `P1 -> L1 -> P2 -> L2 -> B -> P1 ...`. `Ending` has no successor
    /// in the cycle; it is left by either a rematch or the Ending Job.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::P1Action => Some(Phase::Lockout1),
            Phase::Lockout1 => Some(Phase::P2Reaction),
            Phase::P2Reaction => Some(Phase::Lockout2),
            Phase::Lockout2 => Some(Phase::Broadcast),
            Phase::Broadcast => Some(Phase::P1Action),
            Phase::Ending => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    Active,
    Completed,
    Cancelled,
}

/// Per-session phase durations, all in minutes. Overridable per
/// session via `CreateSessionRequest.durations`; `Default` gives the
/// house-rules schedule of 50/10/20/10/1/5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub p1_action_minutes: u32,
    pub lockout1_minutes: u32,
    pub p2_reaction_minutes: u32,
    pub lockout2_minutes: u32,
    pub broadcast_minutes: u32,
    pub ending_minutes: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            p1_action_minutes: 50,
            lockout1_minutes: 10,
            p2_reaction_minutes: 20,
            lockout2_minutes: 10,
            broadcast_minutes: 1,
            ending_minutes: 5,
        }
    }
}

impl PhaseDurations {
    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::P1Action => self.p1_action_minutes,
            Phase::Lockout1 => self.lockout1_minutes,
            Phase::P2Reaction => self.p2_reaction_minutes,
            Phase::Lockout2 => self.lockout2_minutes,
            Phase::Broadcast => self.broadcast_minutes,
            Phase::Ending => self.ending_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_from_broadcast_to_p1() {
        assert_eq!(Phase::Broadcast.next(), Some(Phase::P1Action));
    }

    #[test]
    fn ending_has_no_cycle_successor() {
        assert_eq!(Phase::Ending.next(), None);
    }
}
