//! HTTP REST API routes.

mod admin_routes;
mod auth;
mod error_mapping;
mod game_routes;
mod ids;
mod views;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;

use crate::infrastructure::state::AppState;

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.sessions.list_active().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Builds the full router. `Router<Arc<AppState>>` so the caller
/// attaches `.with_state(...)` once, after layering CORS/trace on top.
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        // Admin
        .route("/admin/sessions", post(admin_routes::create_session))
        .route("/admin/sessions/{id}", put(admin_routes::update_session_config))
        .route("/admin/sessions/{id}/start", post(admin_routes::start_session))
        .route("/admin/sessions/{id}/end", post(admin_routes::end_session))
        .route("/admin/sessions/{id}/restart", post(admin_routes::restart_session))
        .route(
            "/admin/sessions/{id}/discord-channel",
            post(admin_routes::bind_discord_channel).delete(admin_routes::unbind_discord_channel),
        )
        .route(
            "/admin/sessions/{id}/slack-channel",
            post(admin_routes::bind_slack_channel).delete(admin_routes::unbind_slack_channel),
        )
        // Game: sessions
        .route("/game/sessions", get(game_routes::list_sessions))
        .route("/game/sessions/discord-channels", get(game_routes::list_discord_channels))
        .route("/game/sessions/slack-channels", get(game_routes::list_slack_channels))
        .route("/game/sessions/{id}", get(game_routes::get_session))
        .route("/game/sessions/{id}/status", get(game_routes::get_session_status))
        .route("/game/sessions/{id}/join", post(game_routes::join_session))
        .route("/game/sessions/{id}/leave", post(game_routes::leave_session))
        .route("/game/sessions/{id}/request-rematch", post(game_routes::request_rematch))
        // Game: actions/reactions
        .route(
            "/game/actions/{session_id}",
            post(game_routes::set_pending_action).get(game_routes::list_pending_actions),
        )
        .route("/game/actions/{session_id}/resolve-swap", post(game_routes::resolve_swap))
        .route(
            "/game/reactions/{session_id}",
            post(game_routes::set_reaction).get(game_routes::list_reactions),
        )
        // Game: state / chat / history
        .route("/game/state/{session_id}", get(game_routes::get_game_state))
        .route(
            "/game/chat/{session_id}/send",
            post(game_routes::send_chat_message),
        )
        .route(
            "/game/chat/{session_id}/messages",
            get(game_routes::peek_chat_messages),
        )
        .route("/game/history/{session_id}", get(game_routes::get_turn_history))
}
