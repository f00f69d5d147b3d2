pub mod actions;
pub mod channel_binding;
pub mod chat;
pub mod deck;
pub mod orchestrator;
pub mod session;
pub mod turn_resolver;

pub use actions::ActionUseCases;
pub use channel_binding::ChannelBindingUseCases;
pub use chat::ChatFanoutUseCases;
pub use orchestrator::{OrchestratorPhaseHandler, PhaseOrchestrator};
pub use session::SessionUseCases;
