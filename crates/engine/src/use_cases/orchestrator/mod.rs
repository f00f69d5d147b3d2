//! Phase Transition Orchestrator: the single writer of `current_phase`,
//! `phase_end_time`, and `turn_number` once a session is active.
//! Invoked by the Phase Clock on every timer fire.

use std::sync::Arc;

use chrono::Utc;

use coup_domain::{DomainError, Phase, Session, SessionId, SessionStatus};

use crate::application::ports::{
    PlayerStorePort, ReactionStorePort, SchedulerPort, SessionStorePort, TurnResultStorePort,
};
use crate::use_cases::chat::ChatFanoutUseCases;
use crate::use_cases::turn_resolver::TurnResolver;

pub struct PhaseOrchestrator {
    pub sessions: Arc<dyn SessionStorePort>,
    pub players: Arc<dyn PlayerStorePort>,
    pub reactions: Arc<dyn ReactionStorePort>,
    pub turn_results: Arc<dyn TurnResultStorePort>,
    pub scheduler: Arc<dyn SchedulerPort>,
    pub chat: Arc<ChatFanoutUseCases>,
}

impl PhaseOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionStorePort>,
        players: Arc<dyn PlayerStorePort>,
        reactions: Arc<dyn ReactionStorePort>,
        turn_results: Arc<dyn TurnResultStorePort>,
        scheduler: Arc<dyn SchedulerPort>,
        chat: Arc<ChatFanoutUseCases>,
    ) -> Self {
        Self { sessions, players, reactions, turn_results, scheduler, chat }
    }

    /// Runs one phase-transition step for `session_id`: close out the
    /// leaving phase, advance `current_phase`, and reschedule. All
    /// within the caller's transaction boundary (the sqlx repositories
    /// each wrap their own statements; see DESIGN.md for the
    /// transaction-scope note).
    pub async fn on_timer_fire(&self, session_id: SessionId) -> Result<(), DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        if !matches!(session.status, SessionStatus::Active) {
            // Step 1: not active, abort silently (e.g. ended concurrently).
            return Ok(());
        }

        let leaving = session
            .current_phase
            .ok_or_else(|| DomainError::fatal("active session missing current_phase"))?;

        if leaving == Phase::Ending {
            // The ending job fired with no rematch requested in the
            // interim (rematch() would have moved current_phase back to
            // p1_action and rescheduled, cancelling this one atomically).
            session.status = SessionStatus::Completed;
            session.current_phase = None;
            session.phase_end_time = None;
            self.sessions.update(session).await?;
            self.scheduler.cancel(session_id).await?;
            return Ok(());
        }

        self.run_leaving_hook(&mut session, leaving).await?;

        let mut players = self.players.list_for_session(session_id).await?;
        let alive_count = players.iter().filter(|p| p.is_alive()).count();

        let next_phase = match leaving.next() {
            Some(Phase::P1Action) if alive_count <= 1 || session.turn_limit_reached() => Phase::Ending,
            Some(next) => next,
            None => Phase::Ending,
        };

        session.current_phase = Some(next_phase);
        let run_at = Utc::now() + chrono::Duration::minutes(session.durations.minutes_for(next_phase) as i64);
        session.phase_end_time = Some(run_at);

        if next_phase == Phase::Ending && alive_count <= 1 {
            session.winners = players
                .iter()
                .filter(|p| p.is_alive())
                .map(|p| p.display_name.clone())
                .collect();
        }

        self.sessions.update(session.clone()).await?;
        for p in players.drain(..) {
            self.players.update(p).await?;
        }

        // The ending phase still schedules a single one-shot fire so it
        // finalises to `completed` if no rematch is requested in time;
        // this reuses the same job slot rather than a distinct
        // ending-job concept, preserving the one-job-per-session
        // invariant.
        self.scheduler.schedule_next(session_id, run_at).await?;

        Ok(())
    }

    async fn run_leaving_hook(&self, session: &mut Session, leaving: Phase) -> Result<(), DomainError> {
        match leaving {
            Phase::P1Action => {
                let players = self.players.list_for_session(session.id).await?;
                let pending = players.iter().filter(|p| p.pending_action.is_some()).count();
                tracing::info!(session_id = %session.id, pending_actions = pending, "leaving P1_action");
            }
            Phase::Lockout1 => {
                tracing::info!(session_id = %session.id, "reactions unlocked for P2_reaction");
            }
            Phase::P2Reaction => {
                self.reactions.lock_all_for_turn(session.id, session.turn_number).await?;
                tracing::info!(session_id = %session.id, turn = session.turn_number, "reactions locked");
            }
            Phase::Lockout2 => {
                self.resolve_turn(session).await?;
            }
            Phase::Broadcast => {
                // The standing broadcast tick in `run.rs` also flushes
                // this session's queue every few minutes regardless of
                // phase; this call just means a session doesn't have to
                // wait for the next tick to see its own chat delivered.
                self.chat.broadcast(session.id).await.ok();
                self.players.clear_pending_actions(session.id).await?;
                session.turn_number += 1;
            }
            Phase::Ending => {}
        }
        Ok(())
    }

    async fn resolve_turn(&self, session: &mut Session) -> Result<(), DomainError> {
        let players = self.players.list_for_session(session.id).await?;
        let reactions = self
            .reactions
            .list_unresolved_for_turn(session.id, session.turn_number)
            .await?;

        let mut rng = rand::thread_rng();
        let resolution = TurnResolver::resolve(session, &players, &reactions, &mut rng);

        session.deck = resolution.deck;
        session.revealed = resolution.revealed;
        session.last_turn_summary = Some(resolution.turn_result.summary.clone());

        for player in resolution.players {
            self.players.update(player).await?;
        }
        for id in resolution.resolved_reaction_ids {
            self.reactions.mark_resolved(id).await?;
        }
        self.turn_results.save(resolution.turn_result).await?;

        tracing::info!(session_id = %session.id, turn = session.turn_number, "turn resolved");
        Ok(())
    }
}

/// Thin handler adapter registered with the scheduler; logs and
/// swallows orchestrator errors so a single failing session never
/// brings down the timer loop. A *fatal* failure here leaves the
/// session in whichever phase it was leaving, for a retry on the next
/// fire.
pub struct OrchestratorPhaseHandler {
    pub orchestrator: Arc<PhaseOrchestrator>,
}

impl OrchestratorPhaseHandler {
    pub fn new(orchestrator: Arc<PhaseOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait::async_trait]
impl crate::application::ports::PhaseFiredHandler for OrchestratorPhaseHandler {
    async fn on_phase_fired(&self, session_id: SessionId) {
        if let Err(err) = self.orchestrator.on_timer_fire(session_id).await {
            tracing::error!(session_id = %session_id, error = %err, "phase transition failed; will retry on next fire");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coup_domain::SessionConfig;

    use crate::application::ports::{
        MockChatQueuePort, MockGatewayPushPort, MockLlmPushPort, MockPlayerStorePort, MockReactionStorePort,
        MockSchedulerPort, MockSessionStorePort, MockTurnResultStorePort,
    };

    fn chat_fanout() -> Arc<ChatFanoutUseCases> {
        Arc::new(ChatFanoutUseCases::new(
            Arc::new(MockChatQueuePort::new()),
            Arc::new(MockGatewayPushPort::new()),
            Arc::new(MockLlmPushPort::new()),
            None,
        ))
    }

    #[tokio::test]
    async fn a_fired_ending_job_finalises_the_session_and_cancels_its_own_slot() {
        let session_id = SessionId::new();
        let mut session = Session::new(session_id, SessionConfig::default());
        session.status = SessionStatus::Active;
        session.current_phase = Some(Phase::Ending);

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));
        sessions
            .expect_update()
            .withf(|s| s.status == SessionStatus::Completed && s.current_phase.is_none())
            .returning(|s| Ok(s));

        let mut scheduler = MockSchedulerPort::new();
        scheduler.expect_cancel().with(mockall::predicate::eq(session_id)).returning(|_| Ok(()));

        let orchestrator = PhaseOrchestrator::new(
            Arc::new(sessions),
            Arc::new(MockPlayerStorePort::new()),
            Arc::new(MockReactionStorePort::new()),
            Arc::new(MockTurnResultStorePort::new()),
            Arc::new(scheduler),
            chat_fanout(),
        );

        orchestrator.on_timer_fire(session_id).await.unwrap();
    }

    #[tokio::test]
    async fn a_fire_on_a_non_active_session_is_a_silent_no_op() {
        let session_id = SessionId::new();
        let mut session = Session::new(session_id, SessionConfig::default());
        session.status = SessionStatus::Cancelled;

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let orchestrator = PhaseOrchestrator::new(
            Arc::new(sessions),
            Arc::new(MockPlayerStorePort::new()),
            Arc::new(MockReactionStorePort::new()),
            Arc::new(MockTurnResultStorePort::new()),
            Arc::new(MockSchedulerPort::new()),
            chat_fanout(),
        );

        orchestrator.on_timer_fire(session_id).await.unwrap();
    }
}
