//! Composition root: load config, build `AppState`, start the phase
//! clock and HTTP server side by side, shut down on ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coup_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting coup engine");

    let config = AppConfig::from_env()?;
    tracing::info!(database_url = %config.database_url, port = config.server_port, "configuration loaded");

    let state = Arc::new(AppState::new(config).await?);
    tracing::info!("application state initialised");

    state.scheduler.recover_on_startup().await?;

    let phase_clock_task = {
        let scheduler = state.scheduler.clone();
        let handler = state.phase_fired_handler();
        let poll_interval = Duration::from_secs(state.config.phase_clock_poll_interval_seconds);
        tokio::spawn(async move {
            tracing::info!("starting phase clock");
            scheduler.run_loop(handler, poll_interval).await;
        })
    };

    let broadcast_tick_task = {
        let state = state.clone();
        let tick_interval = Duration::from_secs(state.config.broadcast_tick_interval_seconds);
        tokio::spawn(async move {
            tracing::info!(?tick_interval, "starting chat broadcast tick");
            run_broadcast_tick(state, tick_interval).await;
        })
    };

    let cors_layer = if state.config.cors_allowed_origins.len() == 1 && state.config.cors_allowed_origins[0] == "*" {
        tracing::warn!("CORS configured to allow ANY origin; tighten CORS_ALLOWED_ORIGINS for production");
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<_> = state.config.cors_allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    let app: Router<()> = Router::new()
        .merge(http::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    tokio::select! {
        result = server => result?,
        _ = phase_clock_task => {}
        _ = broadcast_tick_task => {}
    }

    Ok(())
}

/// Sweeps every active session on a fixed interval and broadcasts its
/// queued chat, independent of where that session's own phase clock
/// happens to be. This runs alongside (not instead of) the per-session
/// broadcast-phase hook in the orchestrator, so a session still gets
/// its queue flushed even if it idles in one phase for multiple ticks.
async fn run_broadcast_tick(state: Arc<AppState>, tick_interval: Duration) {
    let mut interval = tokio::time::interval(tick_interval);
    loop {
        interval.tick().await;
        let sessions = match state.sessions.list_active().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::error!(error = %err, "broadcast tick: failed to list active sessions");
                continue;
            }
        };
        for session in sessions {
            if let Err(err) = state.chat_uc.broadcast(session.id).await {
                tracing::warn!(session_id = %session.id, error = %err, "broadcast tick failed for session");
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async { tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler") };
    ctrl_c.await;
    tracing::info!("shutdown signal received");
}
