//! Action/reaction submission: `set_pending_action` and `set_reaction`.
//! Both validate against the session's current phase and overwrite any
//! previous value for the same player/slot (last-write-wins).

use std::sync::Arc;

use coup_domain::action::{Reaction, ReactionKind};
use coup_domain::{Action, ActionKind, DomainError, Phase, Role, SessionId, UpgradeFlags, UserId};

use coup_domain::PlayerGameState;

use crate::application::ports::{PlayerStorePort, ReactionStorePort, SessionStorePort};
use crate::use_cases::deck::DeckManager;

pub struct ActionUseCases {
    pub sessions: Arc<dyn SessionStorePort>,
    pub players: Arc<dyn PlayerStorePort>,
    pub reactions: Arc<dyn ReactionStorePort>,
}

impl ActionUseCases {
    pub fn new(
        sessions: Arc<dyn SessionStorePort>,
        players: Arc<dyn PlayerStorePort>,
        reactions: Arc<dyn ReactionStorePort>,
    ) -> Self {
        Self { sessions, players, reactions }
    }

    /// Builds the `Action` from a requested kind + target, validating
    /// the target is alive and in-session for targeted actions, and
    /// that the actor can afford it (cost check is advisory here; the
    /// resolver re-checks at resolution time since coins may change
    /// between submission and lockout).
    pub async fn set_pending_action(
        &self,
        session_id: SessionId,
        actor: UserId,
        kind: ActionKind,
        target_display_name: Option<String>,
        upgrade_enabled: bool,
        assassination_priority: Option<Role>,
    ) -> Result<Action, DomainError> {
        let session = self.sessions.get(session_id).await?;
        if !matches!(session.current_phase, Some(Phase::P1Action)) {
            return Err(DomainError::invalid_state("actions may only be submitted during P1_action"));
        }

        let mut actor_state = self.players.get(session_id, &actor).await?;
        if !actor_state.is_alive() {
            return Err(DomainError::invalid_state("eliminated players cannot act"));
        }

        let target = match target_display_name {
            Some(name) => Some(self.resolve_target(session_id, &actor, &name).await?),
            None => None,
        };

        let action = match kind {
            ActionKind::Income => Action::Income,
            ActionKind::ForeignAid => Action::ForeignAid,
            ActionKind::Tax => Action::Tax,
            ActionKind::Steal => Action::Steal {
                target: target.ok_or_else(|| DomainError::precondition("steal requires a target"))?,
            },
            ActionKind::Assassinate => Action::Assassinate {
                target: target.ok_or_else(|| DomainError::precondition("assassinate requires a target"))?,
                upgrade: upgrade_enabled && session.upgrades_enabled,
            },
            ActionKind::Coup => Action::Coup {
                target: target.ok_or_else(|| DomainError::precondition("coup requires a target"))?,
            },
            ActionKind::Swap => Action::Swap { upgrade: upgrade_enabled && session.upgrades_enabled },
        };

        if actor_state.coins < action.coin_cost() {
            return Err(DomainError::precondition(format!(
                "need {} coins for {}, have {}",
                action.coin_cost(),
                action.kind(),
                actor_state.coins
            )));
        }

        // At 10+ coins, coup is the only legal action in most house
        // rules; not enforced here, left to the caller's table rules.

        actor_state.pending_action = Some(action.clone());
        if let Some(priority) = assassination_priority {
            actor_state.upgrade_flags = Some(UpgradeFlags { assassination_priority: Some(priority) });
        }
        self.players.update(actor_state).await?;
        Ok(action)
    }

    async fn resolve_target(&self, session_id: SessionId, actor: &UserId, display_name: &str) -> Result<UserId, DomainError> {
        let players = self.players.list_for_session(session_id).await?;
        let target = players
            .iter()
            .find(|p| p.display_name == display_name)
            .ok_or_else(|| DomainError::not_found(format!("no player named {display_name}")))?;
        if !target.is_alive() {
            return Err(DomainError::precondition("target is already eliminated"));
        }
        if &target.user_id == actor {
            return Err(DomainError::precondition("cannot target yourself"));
        }
        Ok(target.user_id.clone())
    }

    /// Last-write-wins for the same `(reactor, actor, action)` tuple.
    pub async fn set_reaction(
        &self,
        session_id: SessionId,
        reactor: UserId,
        target_player_display_name: String,
        kind: ReactionKind,
        block_with_role: Option<Role>,
    ) -> Result<Reaction, DomainError> {
        let session = self.sessions.get(session_id).await?;
        if !matches!(session.current_phase, Some(Phase::P2Reaction)) {
            return Err(DomainError::invalid_state("reactions may only be submitted during P2_reaction"));
        }

        let players = self.players.list_for_session(session_id).await?;
        let actor = players
            .iter()
            .find(|p| p.display_name == target_player_display_name)
            .ok_or_else(|| DomainError::not_found(format!("no player named {target_player_display_name}")))?;
        let pending = actor
            .pending_action
            .clone()
            .ok_or_else(|| DomainError::invalid_state("that player has no pending action"))?;

        if kind == ReactionKind::Challenge && !pending.is_challengeable() {
            return Err(DomainError::precondition("that action cannot be challenged"));
        }
        if kind == ReactionKind::Block {
            match block_with_role {
                Some(role) if !pending.blockable_by().contains(&role) => {
                    return Err(DomainError::precondition(format!("{role} cannot block that action")));
                }
                None if pending.blockable_by().is_empty() => {
                    return Err(DomainError::precondition("that action cannot be blocked"));
                }
                _ => {}
            }
        }

        let reaction = Reaction {
            id: coup_domain::ReactionId(0), // assigned by the store on insert
            session_id,
            turn_number: session.turn_number,
            reactor_user_id: reactor,
            actor_user_id: actor.user_id.clone(),
            target_action: pending.kind(),
            kind,
            block_with_role,
            is_locked: false,
            is_resolved: false,
        };
        self.reactions.add(reaction).await
    }

    /// Follow-up to a resolved `Swap`: the player's hand temporarily
    /// holds up to 4 cards (the Turn Resolver already drew 2 new ones
    /// in); this picks which 2 to keep and returns the rest to the
    /// session's deck, reshuffled.
    pub async fn resolve_swap(
        &self,
        session_id: SessionId,
        actor: UserId,
        keep: Vec<Role>,
    ) -> Result<PlayerGameState, DomainError> {
        let mut session = self.sessions.get(session_id).await?;
        let mut player = self.players.get(session_id, &actor).await?;
        if player.hand.len() <= 2 {
            return Err(DomainError::invalid_state("no pending swap to resolve"));
        }
        if keep.len() != 2 {
            return Err(DomainError::precondition("must keep exactly 2 cards"));
        }

        let mut remaining = player.hand.clone();
        let mut kept = Vec::with_capacity(2);
        for role in keep {
            let idx = remaining
                .iter()
                .position(|r| *r == role)
                .ok_or_else(|| DomainError::precondition(format!("{role} is not in hand")))?;
            kept.push(remaining.remove(idx));
        }

        let mut rng = rand::thread_rng();
        DeckManager::return_cards(&mut session.deck, remaining, true, &mut rng);
        player.hand = kept;

        self.sessions.update(session).await?;
        self.players.update(player).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coup_domain::{Session, SessionConfig, SessionId, UserId};

    use crate::application::ports::{MockPlayerStorePort, MockReactionStorePort, MockSessionStorePort};

    fn session_with_hand() -> (Session, PlayerGameState) {
        let session_id = SessionId::new();
        let session = Session::new(session_id, SessionConfig::default());
        let mut player = PlayerGameState::new(UserId::from("alice"), session_id, "alice".into(), 0);
        player.hand = vec![Role::Duke, Role::Assassin, Role::Captain, Role::Ambassador];
        (session, player)
    }

    #[tokio::test]
    async fn resolve_swap_keeps_chosen_two_and_returns_the_rest() {
        let (session, player) = session_with_hand();
        let session_id = session.id;
        let user_id = player.user_id.clone();

        let mut sessions = MockSessionStorePort::new();
        let session_clone = session.clone();
        sessions.expect_get().returning(move |_| Ok(session_clone.clone()));
        sessions.expect_update().returning(|s| Ok(s));

        let mut players = MockPlayerStorePort::new();
        let player_clone = player.clone();
        players.expect_get().returning(move |_, _| Ok(player_clone.clone()));
        players.expect_update().returning(|p| Ok(p));

        let uc = ActionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockReactionStorePort::new()));

        let result = uc
            .resolve_swap(session_id, user_id, vec![Role::Duke, Role::Captain])
            .await
            .expect("swap resolves");

        assert_eq!(result.hand, vec![Role::Duke, Role::Captain]);
    }

    #[tokio::test]
    async fn resolve_swap_rejects_a_hand_that_is_not_mid_swap() {
        let (session, mut player) = session_with_hand();
        player.hand = vec![Role::Duke, Role::Captain];
        let session_id = session.id;
        let user_id = player.user_id.clone();

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let mut players = MockPlayerStorePort::new();
        players.expect_get().returning(move |_, _| Ok(player.clone()));

        let uc = ActionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockReactionStorePort::new()));

        let err = uc.resolve_swap(session_id, user_id, vec![Role::Duke, Role::Captain]).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn resolve_swap_rejects_keeping_a_card_not_in_hand() {
        let (session, player) = session_with_hand();
        let session_id = session.id;
        let user_id = player.user_id.clone();

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let mut players = MockPlayerStorePort::new();
        players.expect_get().returning(move |_, _| Ok(player.clone()));

        let uc = ActionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockReactionStorePort::new()));

        let err = uc.resolve_swap(session_id, user_id, vec![Role::Duke, Role::Contessa]).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn resolve_swap_rejects_keeping_anything_other_than_two() {
        let (session, player) = session_with_hand();
        let session_id = session.id;
        let user_id = player.user_id.clone();

        let mut sessions = MockSessionStorePort::new();
        sessions.expect_get().returning(move |_| Ok(session.clone()));

        let mut players = MockPlayerStorePort::new();
        players.expect_get().returning(move |_, _| Ok(player.clone()));

        let uc = ActionUseCases::new(Arc::new(sessions), Arc::new(players), Arc::new(MockReactionStorePort::new()));

        let err = uc.resolve_swap(session_id, user_id, vec![Role::Duke]).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }
}
