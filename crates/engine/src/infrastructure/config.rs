//! Application configuration loaded from the environment.

use std::env;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// sqlx SQLite connection string, e.g. `sqlite://./data/coup.db`.
    pub database_url: String,

    /// Bind port for the REST API.
    pub server_port: u16,

    /// CORS allowed origins (comma-separated, or "*" for any).
    pub cors_allowed_origins: Vec<String>,

    /// Reasoning server base URL for the LLM event push. `None`
    /// disables the push entirely rather than retrying a bad URL.
    pub reasoning_server_url: Option<String>,

    /// How often the phase clock polls `phase_jobs` for due sessions.
    pub phase_clock_poll_interval_seconds: u64,

    /// How far overdue a phase job can be before the clock logs it as
    /// a misfire instead of a routine late fire. Does not drop the job.
    pub phase_clock_misfire_grace_seconds: u64,

    /// How often the standing chat broadcast tick sweeps every active
    /// session, independent of any session's own phase timing.
    pub broadcast_tick_interval_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://./data/coup.db".to_string()),

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            reasoning_server_url: env::var("REASONING_SERVER_URL").ok().filter(|s| !s.is_empty()),

            phase_clock_poll_interval_seconds: env::var("PHASE_CLOCK_POLL_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            phase_clock_misfire_grace_seconds: env::var("PHASE_CLOCK_MISFIRE_GRACE_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),

            broadcast_tick_interval_seconds: env::var("BROADCAST_TICK_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
        })
    }
}
