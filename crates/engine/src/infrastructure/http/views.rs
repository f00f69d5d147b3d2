//! Maps domain/use-case types onto the wire response DTOs. Kept
//! separate from the route handlers so a handler's job stays "call the
//! use case, render the result".

use chrono::Utc;

use coup_domain::{PlayerGameState, Reaction, Session, TurnResult, UserId};
use coup_protocol::{
    ActionResultView, ChatMessageView, PlayerPrivateView, PlayerPublicView, ReactionView,
    SessionStatusView, SessionView, TurnResultView,
};

pub fn session_view(session: &Session) -> SessionView {
    SessionView {
        session_id: session.id.to_string(),
        name: session.name.clone(),
        status: session.status,
        current_phase: session.current_phase,
        turn_number: session.turn_number,
        turn_limit: session.turn_limit,
        max_players: session.max_players,
        upgrades_enabled: session.upgrades_enabled,
        rematch_count: session.rematch_count,
        winners: session.winners.clone(),
        discord_channel_id: session.discord_channel_id.clone(),
        slack_channel_id: session.slack_channel_id.clone(),
        created_at: session.created_at,
    }
}

pub fn session_status_view(session: &Session) -> SessionStatusView {
    let time_remaining_seconds = session
        .phase_end_time
        .map(|end| (end - Utc::now()).num_seconds().max(0));
    SessionStatusView {
        session: session_view(session),
        time_remaining_seconds,
        last_turn_summary: session.last_turn_summary.clone(),
    }
}

fn display_name_of<'a>(players: &'a [PlayerGameState], user_id: &UserId) -> Option<&'a str> {
    players.iter().find(|p| &p.user_id == user_id).map(|p| p.display_name.as_str())
}

pub fn player_public_view(player: &PlayerGameState, players: &[PlayerGameState]) -> PlayerPublicView {
    let pending_target = player
        .pending_action
        .as_ref()
        .and_then(|a| a.target())
        .and_then(|target| display_name_of(players, target))
        .map(str::to_string);
    PlayerPublicView {
        display_name: player.display_name.clone(),
        coins: player.coins,
        is_alive: player.is_alive(),
        hand_count: player.hand.len(),
        pending_action: player.pending_action_kind(),
        pending_target,
    }
}

pub fn player_private_view(player: &PlayerGameState, players: &[PlayerGameState]) -> PlayerPrivateView {
    PlayerPrivateView {
        public: player_public_view(player, players),
        hand: player.hand.clone(),
    }
}

pub fn reaction_view(reaction: &Reaction, players: &[PlayerGameState]) -> ReactionView {
    ReactionView {
        reactor_display_name: display_name_of(players, &reaction.reactor_user_id)
            .unwrap_or("unknown")
            .to_string(),
        actor_display_name: display_name_of(players, &reaction.actor_user_id)
            .unwrap_or("unknown")
            .to_string(),
        target_action: reaction.target_action,
        kind: reaction.kind,
        block_with_role: reaction.block_with_role,
    }
}

pub fn turn_result_view(result: &TurnResult, players: &[PlayerGameState]) -> TurnResultView {
    TurnResultView {
        turn_number: result.turn_number,
        actions: result
            .actions
            .iter()
            .map(|a| ActionResultView {
                actor_display_name: display_name_of(players, &a.actor).unwrap_or("unknown").to_string(),
                action: a.action,
                target_display_name: a.target.as_ref().and_then(|t| display_name_of(players, t)).map(str::to_string),
                outcome: a.outcome,
                cards_revealed: a.cards_revealed.clone(),
                coins_transferred: a.coins_transferred,
                description: a.description.clone(),
            })
            .collect(),
        players_eliminated: result
            .players_eliminated
            .iter()
            .map(|u| display_name_of(players, u).unwrap_or("unknown").to_string())
            .collect(),
        summary: result.summary.clone(),
    }
}

pub fn chat_message_view(message: &coup_domain::ChatMessage) -> ChatMessageView {
    ChatMessageView {
        id: message.id.0,
        sender_display_name: message.sender_display_name.clone(),
        platform: message.platform,
        content: message.content.clone(),
        created_at: message.created_at,
    }
}
