//! sqlx-backed `ChannelBindingPort`. Bindings live directly on the
//! `sessions` row (`discord_channel_id` / `slack_channel_id`) rather
//! than a separate table, since a channel binds to exactly one session
//! and a session to at most one channel per platform.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coup_domain::{DomainError, Session, SessionId};

use crate::application::ports::ChannelBindingPort;

pub struct SqliteChannelBindingRepo {
    pool: SqlitePool,
}

impl SqliteChannelBindingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn touch(&self, session_id: SessionId, column: &str, value: Option<&str>) -> Result<(), DomainError> {
        let row = sqlx::query("SELECT data_json FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("lookup session failed: {e}")))?
            .ok_or_else(|| DomainError::not_found(format!("session {session_id}")))?;
        let json: String = row.get("data_json");
        let mut session: Session =
            serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt session row: {e}")))?;
        match column {
            "discord_channel_id" => session.discord_channel_id = value.map(str::to_string),
            "slack_channel_id" => session.slack_channel_id = value.map(str::to_string),
            _ => unreachable!("internal column name"),
        }
        let json = serde_json::to_string(&session)
            .map_err(|e| DomainError::fatal(format!("serialize session: {e}")))?;
        let query = format!("UPDATE sessions SET {column} = ?, data_json = ? WHERE id = ?");
        sqlx::query(&query)
            .bind(value)
            .bind(json)
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("update channel binding failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ChannelBindingPort for SqliteChannelBindingRepo {
    async fn bind_discord(&self, session_id: SessionId, channel_id: &str) -> Result<(), DomainError> {
        self.touch(session_id, "discord_channel_id", Some(channel_id)).await
    }

    async fn unbind_discord(&self, session_id: SessionId) -> Result<(), DomainError> {
        self.touch(session_id, "discord_channel_id", None).await
    }

    async fn bind_slack(&self, session_id: SessionId, channel_id: &str) -> Result<(), DomainError> {
        self.touch(session_id, "slack_channel_id", Some(channel_id)).await
    }

    async fn unbind_slack(&self, session_id: SessionId) -> Result<(), DomainError> {
        self.touch(session_id, "slack_channel_id", None).await
    }

    async fn list_discord_bindings(&self) -> Result<Vec<(SessionId, String)>, DomainError> {
        let rows = sqlx::query("SELECT id, discord_channel_id FROM sessions WHERE discord_channel_id IS NOT NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list discord bindings failed: {e}")))?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let channel: String = row.get("discord_channel_id");
                let session_id = uuid::Uuid::parse_str(&id)
                    .map(SessionId::from_uuid)
                    .map_err(|e| DomainError::fatal(format!("corrupt session id: {e}")))?;
                Ok((session_id, channel))
            })
            .collect()
    }

    async fn list_slack_bindings(&self) -> Result<Vec<(SessionId, String)>, DomainError> {
        let rows = sqlx::query("SELECT id, slack_channel_id FROM sessions WHERE slack_channel_id IS NOT NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list slack bindings failed: {e}")))?;
        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let channel: String = row.get("slack_channel_id");
                let session_id = uuid::Uuid::parse_str(&id)
                    .map(SessionId::from_uuid)
                    .map_err(|e| DomainError::fatal(format!("corrupt session id: {e}")))?;
                Ok((session_id, channel))
            })
            .collect()
    }
}
