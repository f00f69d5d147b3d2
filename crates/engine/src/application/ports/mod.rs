//! Outbound port traits. Per ADR-009, every collaborator the use cases
//! talk to is injected as an `Arc<dyn ...Port>` rather than a concrete
//! struct, so infrastructure (sqlx, reqwest) can be swapped for test
//! doubles without touching use-case code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coup_domain::{
    ChatBotEndpoint, ChatMessage, DomainError, Phase, Platform, Reaction, Session, SessionId,
    TurnResult, UserId,
};
use coup_domain::player::PlayerGameState;

pub type PortResult<T> = Result<T, DomainError>;

/// Session Store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStorePort: Send + Sync {
    async fn create(&self, session: Session) -> PortResult<Session>;
    async fn get(&self, session_id: SessionId) -> PortResult<Session>;
    async fn list(&self) -> PortResult<Vec<Session>>;
    async fn update(&self, session: Session) -> PortResult<Session>;
    async fn delete(&self, session_id: SessionId) -> PortResult<()>;
    async fn list_active(&self) -> PortResult<Vec<Session>>;
    async fn find_by_discord_channel(&self, channel_id: &str) -> PortResult<Option<Session>>;
    async fn find_by_slack_channel(&self, channel_id: &str) -> PortResult<Option<Session>>;
}

/// Player Game-State Store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerStorePort: Send + Sync {
    async fn join(&self, player: PlayerGameState) -> PortResult<PlayerGameState>;
    async fn get(&self, session_id: SessionId, user_id: &UserId) -> PortResult<PlayerGameState>;
    async fn list_for_session(&self, session_id: SessionId) -> PortResult<Vec<PlayerGameState>>;
    async fn update(&self, player: PlayerGameState) -> PortResult<PlayerGameState>;
    async fn remove(&self, session_id: SessionId, user_id: &UserId) -> PortResult<()>;
    async fn clear_pending_actions(&self, session_id: SessionId) -> PortResult<()>;
}

/// Reaction storage, keyed by turn so the resolver can fetch exactly
/// the unresolved reactions for the turn it is closing out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReactionStorePort: Send + Sync {
    async fn add(&self, reaction: Reaction) -> PortResult<Reaction>;
    async fn list_unresolved_for_turn(
        &self,
        session_id: SessionId,
        turn_number: u32,
    ) -> PortResult<Vec<Reaction>>;
    async fn lock_all_for_turn(&self, session_id: SessionId, turn_number: u32) -> PortResult<()>;
    async fn mark_resolved(&self, reaction_id: coup_domain::ReactionId) -> PortResult<()>;
}

/// Durable `TurnResult` history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TurnResultStorePort: Send + Sync {
    async fn save(&self, result: TurnResult) -> PortResult<TurnResult>;
    async fn list_for_session(&self, session_id: SessionId) -> PortResult<Vec<TurnResult>>;
}

/// Chat Fan-out queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatQueuePort: Send + Sync {
    async fn enqueue(&self, message: ChatMessage) -> PortResult<ChatMessage>;
    async fn peek(&self, session_id: SessionId) -> PortResult<Vec<ChatMessage>>;
    /// Removes exactly the snapshotted messages (by id), not anything
    /// enqueued concurrently after the snapshot was taken.
    async fn delete_snapshot(&self, ids: &[coup_domain::ChatMessageId]) -> PortResult<()>;
    async fn endpoints_for_session(&self, session_id: SessionId) -> PortResult<Vec<ChatBotEndpoint>>;
    async fn upsert_endpoint(&self, endpoint: ChatBotEndpoint) -> PortResult<ChatBotEndpoint>;
    async fn touch_last_broadcast(
        &self,
        session_id: SessionId,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> PortResult<()>;
}

/// Channel Binding Registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelBindingPort: Send + Sync {
    async fn bind_discord(&self, session_id: SessionId, channel_id: &str) -> PortResult<()>;
    async fn unbind_discord(&self, session_id: SessionId) -> PortResult<()>;
    async fn bind_slack(&self, session_id: SessionId, channel_id: &str) -> PortResult<()>;
    async fn unbind_slack(&self, session_id: SessionId) -> PortResult<()>;
    async fn list_discord_bindings(&self) -> PortResult<Vec<(SessionId, String)>>;
    async fn list_slack_bindings(&self) -> PortResult<Vec<(SessionId, String)>>;
}

/// Phase Clock. A durable, idempotent one-shot scheduler: exactly one
/// outstanding job per session at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchedulerPort: Send + Sync {
    /// Removes any existing job for `session_id` and registers a new
    /// one that fires at `run_at`.
    async fn schedule_next(&self, session_id: SessionId, run_at: DateTime<Utc>) -> PortResult<()>;
    async fn cancel(&self, session_id: SessionId) -> PortResult<()>;
    /// Bootstrap hook: reschedule every job whose `run_at` predates now
    /// by more than the misfire grace window, firing them immediately.
    async fn recover_on_startup(&self) -> PortResult<()>;
}

/// Outbound push to a registered gateway endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayPushPort: Send + Sync {
    async fn push_broadcast(
        &self,
        endpoint_url: &str,
        payload: coup_protocol::GatewayBroadcastPayload,
    ) -> PortResult<()>;
}

/// Outbound fire-and-forget push to the reasoning server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPushPort: Send + Sync {
    async fn push_event(&self, reasoning_url: &str, payload: coup_protocol::LlmEventPayload) -> PortResult<()>;
}

/// Callback the scheduler invokes when a session's phase timer fires.
/// Kept as a port (rather than a concrete type) so the scheduler crate
/// boundary doesn't need to know about the orchestrator's dependencies.
#[async_trait]
pub trait PhaseFiredHandler: Send + Sync {
    async fn on_phase_fired(&self, session_id: SessionId);
}

/// Snapshot of "what phase are we leaving / what is the next phase"
/// used by the orchestrator when deciding `ending` transitions.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTransitionContext {
    pub leaving: Phase,
    pub alive_player_count: usize,
}
