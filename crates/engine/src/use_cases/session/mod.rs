//! Session lifecycle use cases: create, start, restart, rematch, join,
//! leave, update_config. Thin orchestration over the Session Store,
//! Player Store, Deck Manager, and Phase Clock ports — the actual row
//! mutations live in `infrastructure::persistence`.

use std::sync::Arc;

use chrono::Utc;

use coup_domain::{
    DomainError, Phase, PlayerGameState, Session, SessionConfig, SessionId, SessionStatus, UserId,
    REMATCH_LIMIT,
};

use crate::application::ports::{PlayerStorePort, SchedulerPort, SessionStorePort};
use crate::use_cases::deck::DeckManager;

pub struct SessionUseCases {
    pub sessions: Arc<dyn SessionStorePort>,
    pub players: Arc<dyn PlayerStorePort>,
    pub scheduler: Arc<dyn SchedulerPort>,
}

impl SessionUseCases {
    pub fn new(
        sessions: Arc<dyn SessionStorePort>,
        players: Arc<dyn PlayerStorePort>,
        scheduler: Arc<dyn SchedulerPort>,
    ) -> Self {
        Self { sessions, players, scheduler }
    }

    pub async fn create(&self, config: SessionConfig) -> Result<Session, DomainError> {
        if !(2..=6).contains(&config.max_players) {
            return Err(DomainError::precondition("max_players must be in 2..6"));
        }
        let session = Session::new(SessionId::new(), config);
        self.sessions.create(session).await
    }

    pub async fn get(&self, session_id: SessionId) -> Result<Session, DomainError> {
        self.sessions.get(session_id).await
    }

    pub async fn list(&self) -> Result<Vec<Session>, DomainError> {
        self.sessions.list().await
    }

    pub async fn update_config(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut Session),
    ) -> Result<Session, DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        if session.is_game_started() {
            return Err(DomainError::invalid_state("cannot modify active game"));
        }
        f(&mut session);
        self.sessions.update(session).await
    }

    pub async fn join(&self, session_id: SessionId, user_id: UserId, display_name: String) -> Result<PlayerGameState, DomainError> {
        let session = self.sessions.get(session_id).await?;
        if !matches!(session.status, SessionStatus::Waiting) {
            return Err(DomainError::invalid_state("session is not accepting joins"));
        }
        let existing = self.players.list_for_session(session_id).await?;
        if existing.iter().any(|p| p.user_id == user_id) {
            return Err(DomainError::precondition("player already joined"));
        }
        if existing.len() as u32 >= session.max_players {
            return Err(DomainError::precondition("session is full"));
        }
        let join_order = existing.len() as u32;
        let player = PlayerGameState::new(user_id, session_id, display_name, join_order);
        self.players.join(player).await
    }

    pub async fn leave(&self, session_id: SessionId, user_id: UserId) -> Result<(), DomainError> {
        let session = self.sessions.get(session_id).await?;
        if !matches!(session.status, SessionStatus::Waiting) {
            return Err(DomainError::invalid_state("cannot leave once the game has started"));
        }
        self.players.remove(session_id, &user_id).await
    }

    /// Transitions `waiting -> active`: initialises the deck, deals two
    /// cards per joined player, enters `P1_action`.
    pub async fn start(&self, session_id: SessionId) -> Result<Session, DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        if !matches!(session.status, SessionStatus::Waiting) {
            return Err(DomainError::invalid_state("session already started"));
        }
        let mut players = self.players.list_for_session(session_id).await?;
        if players.len() < 2 {
            return Err(DomainError::precondition("need at least 2 players to start"));
        }
        players.sort_by_key(|p| p.join_order);

        let mut rng = rand::thread_rng();
        let mut deck = DeckManager::init(&mut rng);
        let hands = DeckManager::deal(&mut deck, players.len());
        for (player, hand) in players.iter_mut().zip(hands.into_iter()) {
            player.hand = hand;
            player.coins = 2;
            self.players.update(player.clone()).await?;
        }

        session.deck = deck;
        session.revealed = Vec::new();
        session.status = SessionStatus::Active;
        session.current_phase = Some(Phase::P1Action);
        session.turn_number = 1;
        let run_at = Utc::now() + chrono::Duration::minutes(session.durations.p1_action_minutes as i64);
        session.phase_end_time = Some(run_at);

        let session = self.sessions.update(session).await?;
        self.scheduler.schedule_next(session_id, run_at).await?;
        Ok(session)
    }

    pub async fn restart(&self, session_id: SessionId) -> Result<Session, DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        self.scheduler.cancel(session_id).await?;
        let players = self.players.list_for_session(session_id).await?;
        for p in players {
            self.players.remove(session_id, &p.user_id).await?;
        }
        session.status = SessionStatus::Waiting;
        session.current_phase = None;
        session.phase_end_time = None;
        session.turn_number = 1;
        session.rematch_count = 0;
        session.winners.clear();
        session.deck.clear();
        session.revealed.clear();
        self.sessions.update(session).await
    }

    /// Allowed only from `ending`, up to `REMATCH_LIMIT` times. Resets
    /// hands/coins/statuses but keeps the roster.
    pub async fn rematch(&self, session_id: SessionId) -> Result<Session, DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        if !matches!(session.current_phase, Some(Phase::Ending)) {
            return Err(DomainError::invalid_state("rematch is only available during the ending phase"));
        }
        if session.rematch_count >= REMATCH_LIMIT {
            return Err(DomainError::precondition("rematch limit exceeded"));
        }

        let mut players = self.players.list_for_session(session_id).await?;
        players.sort_by_key(|p| p.join_order);
        let mut rng = rand::thread_rng();
        let mut deck = DeckManager::init(&mut rng);
        let hands = DeckManager::deal(&mut deck, players.len());
        for (player, hand) in players.iter_mut().zip(hands.into_iter()) {
            player.reset_for_rematch();
            player.hand = hand;
            self.players.update(player.clone()).await?;
        }

        session.deck = deck;
        session.revealed = Vec::new();
        session.rematch_count += 1;
        session.turn_number = 1;
        session.winners.clear();
        session.current_phase = Some(Phase::P1Action);
        let run_at = Utc::now() + chrono::Duration::minutes(session.durations.p1_action_minutes as i64);
        session.phase_end_time = Some(run_at);

        let session = self.sessions.update(session).await?;
        self.scheduler.schedule_next(session_id, run_at).await?;
        Ok(session)
    }

    /// `POST .../end`: force-terminates an active session.
    pub async fn end(&self, session_id: SessionId) -> Result<Session, DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        self.scheduler.cancel(session_id).await?;
        session.status = SessionStatus::Cancelled;
        session.current_phase = None;
        session.phase_end_time = None;
        self.sessions.update(session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockPlayerStorePort, MockSchedulerPort, MockSessionStorePort};

    #[test]
    fn rematch_limit_constant_matches_spec() {
        assert_eq!(REMATCH_LIMIT, 3);
    }

    #[tokio::test]
    async fn create_rejects_an_out_of_range_player_count() {
        let uc = SessionUseCases::new(
            Arc::new(MockSessionStorePort::new()),
            Arc::new(MockPlayerStorePort::new()),
            Arc::new(MockSchedulerPort::new()),
        );
        let mut config = SessionConfig::default();
        config.max_players = 1;
        let err = uc.create(config).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn join_rejects_once_the_session_is_full() {
        let session_id = SessionId::new();
        let mut config = SessionConfig::default();
        config.max_players = 1;
        let session = Session::new(session_id, config);

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let mut players = MockPlayerStorePort::new();
        players.expect_list_for_session().returning(move |_| {
            Ok(vec![PlayerGameState::new(UserId::from("existing"), session_id, "existing".into(), 0)])
        });

        let uc = SessionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockSchedulerPort::new()));
        let err = uc.join(session_id, UserId::from("newcomer"), "newcomer".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn join_rejects_a_player_already_in_the_session() {
        let session_id = SessionId::new();
        let session = Session::new(session_id, SessionConfig::default());
        let existing = PlayerGameState::new(UserId::from("alice"), session_id, "alice".into(), 0);

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let mut players = MockPlayerStorePort::new();
        let existing_clone = existing.clone();
        players.expect_list_for_session().returning(move |_| Ok(vec![existing_clone.clone()]));

        let uc = SessionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockSchedulerPort::new()));
        let err = uc.join(session_id, existing.user_id.clone(), "alice again".into()).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn start_rejects_fewer_than_two_players() {
        let session_id = SessionId::new();
        let session = Session::new(session_id, SessionConfig::default());

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let mut players = MockPlayerStorePort::new();
        players.expect_list_for_session().returning(move |_| {
            Ok(vec![PlayerGameState::new(UserId::from("alice"), session_id, "alice".into(), 0)])
        });

        let uc = SessionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockSchedulerPort::new()));
        let err = uc.start(session_id).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn rematch_rejects_outside_the_ending_phase() {
        let session_id = SessionId::new();
        let mut session = Session::new(session_id, SessionConfig::default());
        session.current_phase = Some(Phase::P1Action);

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let uc = SessionUseCases::new(
            Arc::new(sessions),
            Arc::new(MockPlayerStorePort::new()),
            Arc::new(MockSchedulerPort::new()),
        );
        let err = uc.rematch(session_id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn rematch_rejects_once_the_limit_is_exhausted() {
        let session_id = SessionId::new();
        let mut session = Session::new(session_id, SessionConfig::default());
        session.current_phase = Some(Phase::Ending);
        session.rematch_count = REMATCH_LIMIT;

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let uc = SessionUseCases::new(
            Arc::new(sessions),
            Arc::new(MockPlayerStorePort::new()),
            Arc::new(MockSchedulerPort::new()),
        );
        let err = uc.rematch(session_id).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }
}
