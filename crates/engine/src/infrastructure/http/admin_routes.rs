//! `/admin/sessions/*`: session lifecycle management and channel
//! binding. These routes are gated behind the `START_GAME` privilege
//! at the table level; verifying *who* is calling is explicitly out of
//! scope here (no JWT/OAuth) so that check is left to whatever
//! upstream gateway fronts this service.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use coup_domain::SessionConfig;
use coup_protocol::{BindChannelRequest, CreateSessionRequest, SessionView, UpdateSessionConfigRequest};

use crate::infrastructure::http::error_mapping::ApiError;
use crate::infrastructure::http::views::session_view;
use crate::infrastructure::http::ids::parse_session_id;
use crate::infrastructure::state::AppState;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let config = SessionConfig {
        name: body.name,
        max_players: body.max_players,
        turn_limit: body.turn_limit,
        upgrades_enabled: body.upgrades_enabled,
        durations: body.durations,
    };
    let session = state.session_uc.create(config).await?;
    Ok((StatusCode::CREATED, Json(session_view(&session))))
}

pub async fn update_session_config(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<UpdateSessionConfigRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state
        .session_uc
        .update_config(session_id, |session| {
            if let Some(name) = body.name {
                session.name = name;
            }
            if let Some(max_players) = body.max_players {
                session.max_players = max_players;
            }
            if let Some(turn_limit) = body.turn_limit {
                session.turn_limit = turn_limit;
            }
            if let Some(upgrades_enabled) = body.upgrades_enabled {
                session.upgrades_enabled = upgrades_enabled;
            }
            if let Some(durations) = body.durations {
                session.durations = durations;
            }
        })
        .await?;
    Ok(Json(session_view(&session)))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.session_uc.start(session_id).await?;
    Ok(Json(session_view(&session)))
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.session_uc.end(session_id).await?;
    Ok(Json(session_view(&session)))
}

pub async fn restart_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let session = state.session_uc.restart(session_id).await?;
    Ok(Json(session_view(&session)))
}

pub async fn bind_discord_channel(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<BindChannelRequest>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state.channel_binding_uc.bind_discord(session_id, body.channel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unbind_discord_channel(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state.channel_binding_uc.unbind_discord(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bind_slack_channel(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<BindChannelRequest>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state.channel_binding_uc.bind_slack(session_id, body.channel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unbind_slack_channel(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state.channel_binding_uc.unbind_slack(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
