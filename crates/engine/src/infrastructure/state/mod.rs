//! Application state and composition: every outbound collaborator is
//! built once here as an `Arc<dyn ...Port>` and handed to whichever use
//! case needs it (per ADR-009, injected directly rather than wrapped in
//! another repository struct).

use std::sync::Arc;

use coup_domain::DomainError;

use crate::application::ports::{
    ChannelBindingPort, PlayerStorePort, ReactionStorePort, SchedulerPort, SessionStorePort,
    TurnResultStorePort,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::gateway::{ReqwestGatewayClient, ReqwestLlmClient};
use crate::infrastructure::persistence::{
    self, SqliteChannelBindingRepo, SqliteChatRepo, SqlitePlayerRepo, SqliteReactionRepo,
    SqliteSessionRepo, SqliteTurnResultRepo,
};
use crate::infrastructure::scheduler::PhaseClockScheduler;
use crate::use_cases::{
    ActionUseCases, ChannelBindingUseCases, ChatFanoutUseCases, OrchestratorPhaseHandler,
    PhaseOrchestrator, SessionUseCases,
};

pub struct AppState {
    pub config: AppConfig,

    pub sessions: Arc<dyn SessionStorePort>,
    pub players: Arc<dyn PlayerStorePort>,
    pub reactions: Arc<dyn ReactionStorePort>,
    pub turn_results: Arc<dyn TurnResultStorePort>,
    pub channel_bindings: Arc<dyn ChannelBindingPort>,

    pub session_uc: SessionUseCases,
    pub action_uc: ActionUseCases,
    pub channel_binding_uc: ChannelBindingUseCases,
    pub chat_uc: Arc<ChatFanoutUseCases>,

    pub orchestrator: Arc<PhaseOrchestrator>,
    pub scheduler: Arc<PhaseClockScheduler>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, DomainError> {
        let pool = persistence::connect(&config.database_url).await?;

        let sessions: Arc<dyn SessionStorePort> = Arc::new(SqliteSessionRepo::new(pool.clone()));
        let players: Arc<dyn PlayerStorePort> = Arc::new(SqlitePlayerRepo::new(pool.clone()));
        let reactions: Arc<dyn ReactionStorePort> = Arc::new(SqliteReactionRepo::new(pool.clone()));
        let turn_results: Arc<dyn TurnResultStorePort> = Arc::new(SqliteTurnResultRepo::new(pool.clone()));
        let chat_queue = Arc::new(SqliteChatRepo::new(pool.clone()));
        let channel_bindings: Arc<dyn ChannelBindingPort> =
            Arc::new(SqliteChannelBindingRepo::new(pool.clone()));

        let misfire_grace = std::time::Duration::from_secs(config.phase_clock_misfire_grace_seconds);
        let scheduler = Arc::new(PhaseClockScheduler::new(pool.clone(), misfire_grace));
        let scheduler_port: Arc<dyn SchedulerPort> = scheduler.clone();

        let gateway = Arc::new(ReqwestGatewayClient::new());
        let llm = Arc::new(ReqwestLlmClient::new());
        let chat_uc = Arc::new(ChatFanoutUseCases::new(
            chat_queue,
            gateway,
            llm,
            config.reasoning_server_url.clone(),
        ));

        let orchestrator = Arc::new(PhaseOrchestrator::new(
            sessions.clone(),
            players.clone(),
            reactions.clone(),
            turn_results.clone(),
            scheduler_port.clone(),
            chat_uc.clone(),
        ));

        let session_uc = SessionUseCases::new(sessions.clone(), players.clone(), scheduler_port.clone());
        let action_uc = ActionUseCases::new(sessions.clone(), players.clone(), reactions.clone());
        let channel_binding_uc = ChannelBindingUseCases::new(channel_bindings.clone());

        Ok(Self {
            config,
            sessions,
            players,
            reactions,
            turn_results,
            channel_bindings,
            session_uc,
            action_uc,
            channel_binding_uc,
            chat_uc,
            orchestrator,
            scheduler,
        })
    }

    /// The handler the phase clock dispatches to on each fired job.
    pub fn phase_fired_handler(self: &Arc<Self>) -> Arc<OrchestratorPhaseHandler> {
        Arc::new(OrchestratorPhaseHandler::new(self.orchestrator.clone()))
    }
}
