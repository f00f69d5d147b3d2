//! sqlx/SQLite adapters for every outbound storage port.

pub mod channel_binding_repo;
pub mod chat_repo;
pub mod connection;
pub mod player_repo;
pub mod reaction_repo;
pub mod session_repo;
pub mod turn_result_repo;

pub use channel_binding_repo::SqliteChannelBindingRepo;
pub use chat_repo::SqliteChatRepo;
pub use connection::connect;
pub use player_repo::SqlitePlayerRepo;
pub use reaction_repo::SqliteReactionRepo;
pub use session_repo::SqliteSessionRepo;
pub use turn_result_repo::SqliteTurnResultRepo;
