//! Session aggregate: config, phase clock state, deck, and channel bindings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Role;
use crate::ids::SessionId;
use crate::phase::{Phase, PhaseDurations, SessionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub max_players: u32,
    pub turn_limit: u32,
    pub upgrades_enabled: bool,
    pub durations: PhaseDurations,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "untitled session".to_string(),
            max_players: 6,
            turn_limit: 0,
            upgrades_enabled: false,
            durations: PhaseDurations::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub status: SessionStatus,
    pub current_phase: Option<Phase>,
    pub phase_end_time: Option<DateTime<Utc>>,
    pub turn_number: u32,
    pub turn_limit: u32,
    pub max_players: u32,
    pub upgrades_enabled: bool,
    pub durations: PhaseDurations,
    pub rematch_count: u32,
    pub winners: Vec<String>,
    /// Ordered deck of undrawn cards.
    pub deck: Vec<Role>,
    /// Cards revealed (and thus removed from circulation) this game.
    pub revealed: Vec<Role>,
    pub discord_channel_id: Option<String>,
    pub slack_channel_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Human-readable summary of the last resolved turn, surfaced to
    /// the broadcast phase by the orchestrator.
    pub last_turn_summary: Option<String>,
}

pub const REMATCH_LIMIT: u32 = 3;

impl Session {
    pub fn new(id: SessionId, config: SessionConfig) -> Self {
        Self {
            id,
            name: config.name,
            status: SessionStatus::Waiting,
            current_phase: None,
            phase_end_time: None,
            turn_number: 1,
            turn_limit: config.turn_limit,
            max_players: config.max_players,
            upgrades_enabled: config.upgrades_enabled,
            durations: config.durations,
            rematch_count: 0,
            winners: Vec::new(),
            deck: Vec::new(),
            revealed: Vec::new(),
            discord_channel_id: None,
            slack_channel_id: None,
            created_at: Utc::now(),
            last_turn_summary: None,
        }
    }

    pub fn is_game_started(&self) -> bool {
        matches!(self.status, SessionStatus::Active)
    }

    /// Invariant: `turn_number <= turn_limit` whenever a limit is set.
    pub fn turn_limit_reached(&self) -> bool {
        self.turn_limit > 0 && self.turn_number > self.turn_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_waiting_with_no_phase() {
        let s = Session::new(SessionId::new(), SessionConfig::default());
        assert_eq!(s.status, SessionStatus::Waiting);
        assert!(s.current_phase.is_none());
        assert!(!s.is_game_started());
    }

    #[test]
    fn turn_limit_zero_means_unlimited() {
        let mut s = Session::new(SessionId::new(), SessionConfig::default());
        s.turn_number = 500;
        assert!(!s.turn_limit_reached());
    }

    #[test]
    fn turn_limit_reached_once_exceeded() {
        let mut s = Session::new(SessionId::new(), SessionConfig { turn_limit: 3, ..SessionConfig::default() });
        s.turn_number = 4;
        assert!(s.turn_limit_reached());
    }
}
