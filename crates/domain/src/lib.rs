//! Pure domain types for the Coup session-scheduling core.
//!
//! No I/O, no async, no framework dependencies — just the entities and
//! invariants of the game and its turn cycle. Infrastructure
//! (`coup-engine`) owns persistence and transport; this crate owns
//! correctness of shape.

pub mod action;
pub mod cards;
pub mod chat;
pub mod error;
pub mod ids;
pub mod phase;
pub mod player;
pub mod session;
pub mod turn_result;

pub use action::{Action, ActionKind, Reaction, ReactionKind};
pub use cards::Role;
pub use chat::{ChatBotEndpoint, ChatMessage, Platform};
pub use error::DomainError;
pub use ids::{ChatMessageId, ReactionId, SessionId, TurnResultId, UserId};
pub use phase::{Phase, PhaseDurations, SessionStatus};
pub use player::{PlayerGameState, PlayerStatus, UpgradeFlags};
pub use session::{Session, SessionConfig, REMATCH_LIMIT};
pub use turn_result::{ActionOutcome, ActionResult, TurnResult};
