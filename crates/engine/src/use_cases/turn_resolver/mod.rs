//! Turn Resolver: a pure function over `(session, players, reactions)`.
//!
//! Deliberately free of wall-clock time and I/O — it is given a snapshot
//! and returns a `Resolution` the caller applies in one commit (ADR-009:
//! lazy ORM loading is replaced by explicit queries returning fully
//! materialised records; the resolver takes a snapshot object and
//! returns a mutation list).

use coup_domain::action::{Reaction, ReactionKind};
use coup_domain::{
    Action, ActionKind, ActionOutcome, ActionResult, PlayerGameState, Role, Session, TurnResult,
    UserId,
};

/// Everything the resolver produced for the caller to persist. Contains
/// whole mutated copies, not deltas, consistent with the rest of the
/// codebase's "materialise the full record" convention.
pub struct Resolution {
    pub turn_result: TurnResult,
    pub players: Vec<PlayerGameState>,
    pub deck: Vec<Role>,
    pub revealed: Vec<Role>,
    pub resolved_reaction_ids: Vec<coup_domain::ReactionId>,
}

/// Ties resolve in join order: the order players joined the session.
fn find_player_mut<'a>(players: &'a mut [PlayerGameState], user_id: &UserId) -> Option<&'a mut PlayerGameState> {
    players.iter_mut().find(|p| &p.user_id == user_id)
}

fn find_player<'a>(players: &'a [PlayerGameState], user_id: &UserId) -> Option<&'a PlayerGameState> {
    players.iter().find(|p| &p.user_id == user_id)
}

/// Returns the earliest (smallest id) reaction of `kind` targeting
/// `actor`'s pending action this turn, among reactions not already
/// consumed by an earlier step of this resolution.
fn earliest<'a>(
    reactions: &'a [Reaction],
    actor: &UserId,
    kind: ReactionKind,
    consumed: &[coup_domain::ReactionId],
) -> Option<&'a Reaction> {
    reactions
        .iter()
        .filter(|r| &r.actor_user_id == actor && r.kind == kind && !consumed.contains(&r.id))
        .min_by_key(|r| r.id)
}

/// Returns the earliest challenge reaction whose `reactor_user_id`
/// targets `subject`'s claim — used both for challenging an action and
/// for counter-challenging a block.
fn earliest_challenge_against<'a>(
    reactions: &'a [Reaction],
    subject: &UserId,
    consumed: &[coup_domain::ReactionId],
) -> Option<&'a Reaction> {
    earliest(reactions, subject, ReactionKind::Challenge, consumed)
}

struct ResolvedAction {
    outcome: ActionOutcome,
    cards_revealed: Vec<Role>,
    coins_transferred: i64,
    description: String,
    cancelled: bool,
}

/// Removes a single copy of `role` from `hand`. Absent an explicit
/// priority, the tie-break is hand index 0.
fn remove_influence(hand: &mut Vec<Role>, priority: Option<Role>) -> Option<Role> {
    if let Some(role) = priority {
        if let Some(idx) = hand.iter().position(|r| *r == role) {
            return Some(hand.remove(idx));
        }
    }
    if hand.is_empty() {
        None
    } else {
        Some(hand.remove(0))
    }
}

pub struct TurnResolver;

impl TurnResolver {
    /// Resolves every alive player's pending action for `session.turn_number`,
    /// applying challenges then blocks then effects, in player-join order.
    ///
    /// `reactions` must be every non-resolved reaction for this turn
    /// number. `rng` supplies shuffles for swap/reveal draws; callers
    /// typically pass `rand::thread_rng()`.
    pub fn resolve<R: rand::Rng>(
        session: &Session,
        players: &[PlayerGameState],
        reactions: &[Reaction],
        rng: &mut R,
    ) -> Resolution {
        let mut players: Vec<PlayerGameState> = players.to_vec();
        players.sort_by_key(|p| p.join_order);

        let mut deck = session.deck.clone();
        let mut revealed = session.revealed.clone();
        let mut consumed_reactions: Vec<coup_domain::ReactionId> = Vec::new();
        let mut turn_result = TurnResult::new(session.id, session.turn_number);

        let actor_ids: Vec<UserId> = players
            .iter()
            .filter(|p| p.is_alive() && p.pending_action.is_some())
            .map(|p| p.user_id.clone())
            .collect();

        for actor_id in actor_ids {
            let action = {
                let actor = find_player(&players, &actor_id).expect("actor present");
                match actor.pending_action.clone() {
                    Some(a) => a,
                    None => continue,
                }
            };

            // (a) cost check
            let cost = action.coin_cost();
            let actor_coins = find_player(&players, &actor_id).expect("actor present").coins;
            if actor_coins < cost {
                turn_result.actions.push(ActionResult {
                    actor: actor_id.clone(),
                    action: action.kind(),
                    target: action.target().cloned(),
                    outcome: ActionOutcome::Failed,
                    cards_revealed: Vec::new(),
                    coins_transferred: 0,
                    description: format!(
                        "{} could not afford {} ({} coins needed)",
                        actor_id, action.kind(), cost
                    ),
                });
                continue;
            }

            let resolved = Self::resolve_one_action(
                session,
                &mut players,
                &action,
                &actor_id,
                reactions,
                &mut consumed_reactions,
                &mut deck,
                &mut revealed,
                rng,
            );

            turn_result.actions.push(ActionResult {
                actor: actor_id.clone(),
                action: action.kind(),
                target: action.target().cloned(),
                outcome: resolved.outcome,
                cards_revealed: resolved.cards_revealed,
                coins_transferred: resolved.coins_transferred,
                description: resolved.description,
            });
        }

        // Step 2: mark anyone out of influence as dead (monotonic).
        for p in players.iter_mut() {
            let was_alive = p.is_alive();
            p.mark_dead_if_out_of_influence();
            if was_alive && !p.is_alive() {
                turn_result.players_eliminated.push(p.user_id.clone());
            }
        }

        turn_result.summary = Self::summarize(&turn_result);

        let resolved_reaction_ids = reactions.iter().map(|r| r.id).collect();

        Resolution {
            turn_result,
            players,
            deck,
            revealed,
            resolved_reaction_ids,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_one_action<R: rand::Rng>(
        session: &Session,
        players: &mut [PlayerGameState],
        action: &Action,
        actor_id: &UserId,
        reactions: &[Reaction],
        consumed: &mut Vec<coup_domain::ReactionId>,
        deck: &mut Vec<Role>,
        revealed: &mut Vec<Role>,
        rng: &mut R,
    ) -> ResolvedAction {
        let mut cards_revealed = Vec::new();
        let mut cancelled = false;
        let mut outcome = ActionOutcome::Success;

        // (b) challenges first.
        if action.is_challengeable() {
            if let Some(challenge) = earliest_challenge_against(reactions, actor_id, consumed) {
                consumed.push(challenge.id);
                let claimed = action.claimed_role().expect("challengeable action has a claim");
                let actor = find_player_mut(players, actor_id).expect("actor present");
                let has_claim = actor.hand.contains(&claimed);

                if has_claim {
                    // Challenger loses an influence; actor reveals the
                    // claimed card and swaps it for a fresh draw.
                    outcome = ActionOutcome::ChallengedWon;
                    let challenger_id = challenge.reactor_user_id.clone();
                    if let Some(idx) = actor.hand.iter().position(|r| *r == claimed) {
                        let card = actor.hand.remove(idx);
                        revealed.push(card);
                        cards_revealed.push(card);
                        deck.push(card);
                        shuffle(deck, rng);
                        if let Some(drawn) = deck.pop() {
                            actor.hand.push(drawn);
                        }
                    }
                    if let Some(challenger) = find_player_mut(players, &challenger_id) {
                        let lost = remove_influence(&mut challenger.hand, None);
                        if let Some(card) = lost {
                            revealed.push(card);
                        }
                    }
                } else {
                    outcome = ActionOutcome::ChallengedLost;
                    cancelled = true;
                    if let Some(card) = remove_influence(&mut actor.hand, None) {
                        revealed.push(card);
                        cards_revealed.push(card);
                    }
                }
            }
        }

        // (c) blocks second, only if not already cancelled and blockable.
        if !cancelled && !action.blockable_by().is_empty() {
            if let Some(block) = earliest(reactions, actor_id, ReactionKind::Block, consumed) {
                consumed.push(block.id);
                let blocker_id = block.reactor_user_id.clone();
                let claimed_block_role = block.block_with_role;

                let counter_challenge = earliest_challenge_against(reactions, &blocker_id, consumed);
                if let Some(counter) = counter_challenge {
                    consumed.push(counter.id);
                    let claimed = claimed_block_role.unwrap_or(Role::Duke);
                    let blocker = find_player_mut(players, &blocker_id);
                    let has_claim = blocker.as_ref().map(|b| b.hand.contains(&claimed)).unwrap_or(false);

                    if has_claim {
                        // Block claim upheld: challenger (who challenged
                        // the block) loses an influence, block succeeds.
                        if let Some(blocker) = find_player_mut(players, &blocker_id) {
                            if let Some(idx) = blocker.hand.iter().position(|r| *r == claimed) {
                                let card = blocker.hand.remove(idx);
                                revealed.push(card);
                                deck.push(card);
                                shuffle(deck, rng);
                                if let Some(drawn) = deck.pop() {
                                    blocker.hand.push(drawn);
                                }
                            }
                        }
                        let challenger_id = counter.reactor_user_id.clone();
                        if let Some(challenger) = find_player_mut(players, &challenger_id) {
                            if let Some(card) = remove_influence(&mut challenger.hand, None) {
                                revealed.push(card);
                            }
                        }
                        cancelled = true;
                        outcome = ActionOutcome::Blocked;
                    } else {
                        // Block was a bluff: blocker loses an influence,
                        // the original action goes through.
                        if let Some(blocker) = find_player_mut(players, &blocker_id) {
                            if let Some(card) = remove_influence(&mut blocker.hand, None) {
                                revealed.push(card);
                            }
                        }
                    }
                } else {
                    // Uncontested block: action cancelled, irrevocable
                    // costs (assassination fee) still apply below.
                    cancelled = true;
                    outcome = ActionOutcome::Blocked;
                }
            }
        }

        // Irrevocable costs are paid regardless of cancellation.
        let mut coins_transferred: i64 = 0;
        if matches!(action, Action::Assassinate { .. } | Action::Coup { .. }) {
            if let Some(actor) = find_player_mut(players, actor_id) {
                let cost = action.coin_cost();
                actor.coins = actor.coins.saturating_sub(cost);
                coins_transferred -= cost as i64;
            }
        }

        let description = if cancelled {
            format!("{actor_id}'s {} was blocked or failed a challenge", action.kind())
        } else {
            Self::apply_effect(session, players, action, actor_id, deck, rng, &mut coins_transferred, &mut cards_revealed)
        };

        if !cancelled && matches!(outcome, ActionOutcome::Success) {
            // leave as Success unless a challenge upgraded it to ChallengedWon
        }

        ResolvedAction {
            outcome,
            cards_revealed,
            coins_transferred,
            description,
            cancelled,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_effect<R: rand::Rng>(
        session: &Session,
        players: &mut [PlayerGameState],
        action: &Action,
        actor_id: &UserId,
        deck: &mut Vec<Role>,
        rng: &mut R,
        coins_transferred: &mut i64,
        cards_revealed: &mut Vec<Role>,
    ) -> String {
        match action {
            Action::Income => {
                if let Some(actor) = find_player_mut(players, actor_id) {
                    actor.coins += 1;
                    *coins_transferred += 1;
                }
                format!("{actor_id} took income (+1 coin)")
            }
            Action::ForeignAid => {
                if let Some(actor) = find_player_mut(players, actor_id) {
                    actor.coins += 2;
                    *coins_transferred += 2;
                }
                format!("{actor_id} took foreign aid (+2 coins)")
            }
            Action::Tax => {
                if let Some(actor) = find_player_mut(players, actor_id) {
                    actor.coins += 3;
                    *coins_transferred += 3;
                }
                format!("{actor_id} collected tax as the duke (+3 coins)")
            }
            Action::Steal { target } => {
                let target_coins = find_player(players, target).map(|p| p.coins).unwrap_or(0);
                let amount = target_coins.min(2);
                if let Some(t) = find_player_mut(players, target) {
                    t.coins -= amount;
                }
                if let Some(actor) = find_player_mut(players, actor_id) {
                    actor.coins += amount;
                }
                *coins_transferred += amount as i64;
                format!("{actor_id} stole {amount} coins from {target}")
            }
            Action::Assassinate { target, upgrade } => {
                let priority = if session.upgrades_enabled && *upgrade {
                    find_player(players, actor_id)
                        .and_then(|p| p.upgrade_flags.as_ref())
                        .and_then(|u| u.assassination_priority)
                } else {
                    None
                };
                if let Some(t) = find_player_mut(players, target) {
                    if let Some(card) = remove_influence(&mut t.hand, priority) {
                        cards_revealed.push(card);
                    }
                }
                format!("{actor_id} assassinated an influence from {target}")
            }
            Action::Coup { target } => {
                if let Some(t) = find_player_mut(players, target) {
                    if let Some(card) = remove_influence(&mut t.hand, None) {
                        cards_revealed.push(card);
                    }
                }
                format!("{actor_id} staged a coup against {target}")
            }
            Action::Swap { .. } => {
                // Draw what remains; insufficient deck is not an error.
                let drawn: Vec<Role> = (0..2).filter_map(|_| deck.pop()).collect();
                if let Some(actor) = find_player_mut(players, actor_id) {
                    actor.hand.extend(drawn.iter().copied());
                }
                format!(
                    "{actor_id} drew {} new card(s) from the ambassador's exchange; choose which to keep",
                    drawn.len()
                )
            }
        }
    }

    fn summarize(result: &TurnResult) -> String {
        if result.actions.is_empty() {
            return "no actions were submitted this turn".to_string();
        }
        result
            .actions
            .iter()
            .map(|a| a.description.clone())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn shuffle<R: rand::Rng>(deck: &mut [Role], rng: &mut R) {
    use rand::seq::SliceRandom;
    deck.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use coup_domain::{ids::ReactionId, SessionConfig, SessionId};
    use rand::SeedableRng;

    fn session() -> Session {
        Session::new(SessionId::new(), SessionConfig::default())
    }

    fn player(name: &str, order: u32, coins: u32, hand: Vec<Role>) -> PlayerGameState {
        let mut p = PlayerGameState::new(UserId::from(name), SessionId::new(), name.to_string(), order);
        p.coins = coins;
        p.hand = hand;
        p
    }

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(42)
    }

    #[test]
    fn uncontested_income_credits_one_coin() {
        let mut s = session();
        s.turn_number = 1;
        let mut alice = player("alice", 0, 2, vec![Role::Duke, Role::Contessa]);
        alice.pending_action = Some(Action::Income);
        let bob = player("bob", 1, 2, vec![Role::Captain, Role::Ambassador]);

        let res = TurnResolver::resolve(&s, &[alice, bob], &[], &mut rng());

        let alice = find_player(&res.players, &UserId::from("alice")).unwrap();
        let bob = find_player(&res.players, &UserId::from("bob")).unwrap();
        assert_eq!(alice.coins, 3);
        assert_eq!(bob.coins, 2);
        assert!(res.turn_result.summary.contains("alice took income (+1 coin)"));
    }

    #[test]
    fn challenged_honest_tax_swaps_actors_card() {
        let mut s = session();
        s.turn_number = 1;
        s.deck = vec![Role::Assassin];
        let mut alice = player("alice", 0, 0, vec![Role::Duke, Role::Contessa]);
        alice.pending_action = Some(Action::Tax);
        let bob = player("bob", 1, 0, vec![Role::Captain, Role::Ambassador]);

        let reaction = Reaction {
            id: ReactionId(1),
            session_id: s.id,
            turn_number: 1,
            reactor_user_id: UserId::from("bob"),
            actor_user_id: UserId::from("alice"),
            target_action: ActionKind::Tax,
            kind: ReactionKind::Challenge,
            block_with_role: None,
            is_locked: true,
            is_resolved: false,
        };

        let res = TurnResolver::resolve(&s, &[alice, bob], &[reaction], &mut rng());
        let alice = find_player(&res.players, &UserId::from("alice")).unwrap();
        assert_eq!(alice.coins, 3);
        assert_eq!(alice.hand.len(), 2);
        assert!(res.revealed.contains(&Role::Duke));
        assert_eq!(res.turn_result.actions[0].outcome, ActionOutcome::ChallengedWon);
    }

    #[test]
    fn bluff_caught_loses_first_card_and_grants_no_coins() {
        let mut s = session();
        s.turn_number = 1;
        let mut alice = player("alice", 0, 0, vec![Role::Contessa, Role::Ambassador]);
        alice.pending_action = Some(Action::Tax);
        let bob = player("bob", 1, 0, vec![Role::Captain, Role::Ambassador]);

        let reaction = Reaction {
            id: ReactionId(1),
            session_id: s.id,
            turn_number: 1,
            reactor_user_id: UserId::from("bob"),
            actor_user_id: UserId::from("alice"),
            target_action: ActionKind::Tax,
            kind: ReactionKind::Challenge,
            block_with_role: None,
            is_locked: true,
            is_resolved: false,
        };

        let res = TurnResolver::resolve(&s, &[alice, bob], &[reaction], &mut rng());
        let alice = find_player(&res.players, &UserId::from("alice")).unwrap();
        assert_eq!(alice.coins, 0);
        assert_eq!(alice.hand, vec![Role::Ambassador]);
        assert_eq!(res.turn_result.actions[0].outcome, ActionOutcome::ChallengedLost);
    }

    #[test]
    fn assassination_blocked_by_contessa_still_pays_fee() {
        let mut s = session();
        s.turn_number = 1;
        let mut alice = player("alice", 0, 3, vec![Role::Assassin, Role::Duke]);
        alice.pending_action = Some(Action::Assassinate { target: UserId::from("bob"), upgrade: false });
        let bob = player("bob", 1, 0, vec![Role::Contessa, Role::Captain]);

        let reaction = Reaction {
            id: ReactionId(1),
            session_id: s.id,
            turn_number: 1,
            reactor_user_id: UserId::from("bob"),
            actor_user_id: UserId::from("alice"),
            target_action: ActionKind::Assassinate,
            kind: ReactionKind::Block,
            block_with_role: Some(Role::Contessa),
            is_locked: true,
            is_resolved: false,
        };

        let res = TurnResolver::resolve(&s, &[alice, bob], &[reaction], &mut rng());
        let alice = find_player(&res.players, &UserId::from("alice")).unwrap();
        let bob = find_player(&res.players, &UserId::from("bob")).unwrap();
        assert_eq!(alice.coins, 0);
        assert_eq!(bob.hand.len(), 2);
        assert_eq!(res.turn_result.actions[0].outcome, ActionOutcome::Blocked);
    }

    #[test]
    fn coup_insufficient_coins_fails_without_effect() {
        let mut s = session();
        s.turn_number = 1;
        let mut alice = player("alice", 0, 6, vec![Role::Duke, Role::Contessa]);
        alice.pending_action = Some(Action::Coup { target: UserId::from("bob") });
        let bob = player("bob", 1, 2, vec![Role::Captain, Role::Ambassador]);

        let res = TurnResolver::resolve(&s, &[alice, bob], &[], &mut rng());
        let bob = find_player(&res.players, &UserId::from("bob")).unwrap();
        assert_eq!(bob.hand.len(), 2);
        assert_eq!(res.turn_result.actions[0].outcome, ActionOutcome::Failed);
    }

    #[test]
    fn death_is_recorded_when_hand_empties() {
        let mut s = session();
        s.turn_number = 1;
        let mut alice = player("alice", 0, 7, vec![Role::Duke, Role::Contessa]);
        alice.pending_action = Some(Action::Coup { target: UserId::from("bob") });
        let bob = player("bob", 1, 0, vec![Role::Captain]);

        let res = TurnResolver::resolve(&s, &[alice, bob], &[], &mut rng());
        assert!(res.turn_result.players_eliminated.contains(&UserId::from("bob")));
        let bob = find_player(&res.players, &UserId::from("bob")).unwrap();
        assert!(!bob.is_alive());
    }
}
