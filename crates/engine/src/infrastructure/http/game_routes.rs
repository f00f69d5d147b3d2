//! `/game/*`: read-only session views, join/leave/rematch,
//! action/reaction submission, chat, and turn history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;

use coup_domain::{ActionKind, ChatMessage, ChatMessageId, DomainError, ReactionKind};
use coup_protocol::{
    ChannelBindingView, ChatMessageView, GameStateView, JoinSessionRequest, PendingActionAck,
    PlayerPrivateView, PlayerPublicView, ReactionView, RequestRematchRequest, ResolveSwapRequest,
    SendChatRequest, SessionStatusView, SessionView, SetPendingActionRequest, SetReactionRequest,
    TurnResultView,
};

use crate::infrastructure::http::auth::{CallerId, CALLER_HEADER};
use crate::infrastructure::http::error_mapping::ApiError;
use crate::infrastructure::http::ids::parse_session_id;
use crate::infrastructure::http::views::{
    chat_message_view, player_private_view, player_public_view, reaction_view, session_status_view,
    session_view, turn_result_view,
};
use crate::infrastructure::state::AppState;

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Result<Json<Vec<SessionView>>, ApiError> {
    let sessions = state.sessions.list().await?;
    Ok(Json(sessions.iter().map(session_view).collect()))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.sessions.get(session_id).await?;
    Ok(Json(session_view(&session)))
}

pub async fn get_session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.sessions.get(session_id).await?;
    Ok(Json(session_status_view(&session)))
}

pub async fn list_discord_channels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChannelBindingView>>, ApiError> {
    let bindings = state.channel_binding_uc.list_discord_bindings().await?;
    Ok(Json(
        bindings
            .into_iter()
            .map(|(session_id, channel_id)| ChannelBindingView { session_id: session_id.to_string(), channel_id })
            .collect(),
    ))
}

pub async fn list_slack_channels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChannelBindingView>>, ApiError> {
    let bindings = state.channel_binding_uc.list_slack_bindings().await?;
    Ok(Json(
        bindings
            .into_iter()
            .map(|(session_id, channel_id)| ChannelBindingView { session_id: session_id.to_string(), channel_id })
            .collect(),
    ))
}

pub async fn join_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    CallerId(user_id): CallerId,
    Json(body): Json<JoinSessionRequest>,
) -> Result<(StatusCode, Json<PlayerPublicView>), ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let player = state.session_uc.join(session_id, user_id, body.display_name).await?;
    let players = state.players.list_for_session(session_id).await?;
    Ok((StatusCode::CREATED, Json(player_public_view(&player, &players))))
}

pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    CallerId(user_id): CallerId,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state.session_uc.leave(session_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn request_rematch(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<RequestRematchRequest>,
) -> Result<Json<SessionView>, ApiError> {
    if !body.confirm {
        return Err(ApiError(DomainError::precondition("rematch request must set confirm=true")));
    }
    let session_id = parse_session_id(&session_id)?;
    let session = state.session_uc.rematch(session_id).await?;
    Ok(Json(session_view(&session)))
}

pub async fn set_pending_action(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    CallerId(actor): CallerId,
    Json(body): Json<SetPendingActionRequest>,
) -> Result<Json<PendingActionAck>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let kind: ActionKind = body.action.into();
    let action = state
        .action_uc
        .set_pending_action(
            session_id,
            actor,
            kind,
            body.target_display_name,
            body.upgrade_enabled,
            body.assassination_priority,
        )
        .await?;
    Ok(Json(PendingActionAck { action }))
}

pub async fn list_pending_actions(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<PlayerPublicView>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let players = state.players.list_for_session(session_id).await?;
    Ok(Json(players.iter().map(|p| player_public_view(p, &players)).collect()))
}

pub async fn resolve_swap(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    CallerId(actor): CallerId,
    Json(body): Json<ResolveSwapRequest>,
) -> Result<Json<PlayerPrivateView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let player = state.action_uc.resolve_swap(session_id, actor, body.keep).await?;
    let players = state.players.list_for_session(session_id).await?;
    Ok(Json(player_private_view(&player, &players)))
}

pub async fn set_reaction(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    CallerId(reactor): CallerId,
    Json(body): Json<SetReactionRequest>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let kind: ReactionKind = body.reaction_type.into();
    state
        .action_uc
        .set_reaction(session_id, reactor, body.target_player, kind, body.block_with_role)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_reactions(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ReactionView>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.sessions.get(session_id).await?;
    let players = state.players.list_for_session(session_id).await?;
    let reactions = state.reactions.list_unresolved_for_turn(session_id, session.turn_number).await?;
    Ok(Json(reactions.iter().map(|r| reaction_view(r, &players)).collect()))
}

pub async fn get_game_state(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<GameStateView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.sessions.get(session_id).await?;
    let players = state.players.list_for_session(session_id).await?;

    let caller = headers.get(CALLER_HEADER).and_then(|v| v.to_str().ok()).map(str::trim).filter(|s| !s.is_empty());
    let you = caller
        .and_then(|user_id| players.iter().find(|p| p.user_id.0 == user_id))
        .map(|p| player_private_view(p, &players));

    Ok(Json(GameStateView {
        session: session_status_view(&session),
        players: players.iter().map(|p| player_public_view(p, &players)).collect(),
        you,
    }))
}

pub async fn send_chat_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<SendChatRequest>,
) -> Result<(StatusCode, Json<ChatMessageView>), ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let message = ChatMessage {
        id: ChatMessageId(0), // assigned by the store on insert
        session_id,
        sender_display_name: body.sender_display_name,
        platform: body.platform,
        content: body.content,
        created_at: Utc::now(),
    };
    let saved = state.chat_uc.queue_message(message).await?;
    Ok((StatusCode::CREATED, Json(chat_message_view(&saved))))
}

pub async fn peek_chat_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatMessageView>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let messages = state.chat_uc.peek(session_id).await?;
    Ok(Json(messages.iter().map(chat_message_view).collect()))
}

pub async fn get_turn_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<TurnResultView>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let players = state.players.list_for_session(session_id).await?;
    let results = state.turn_results.list_for_session(session_id).await?;
    Ok(Json(results.iter().map(|r| turn_result_view(r, &players)).collect()))
}
