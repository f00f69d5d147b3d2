//! sqlx-backed `ChatQueuePort`: the inbound message queue and the
//! registered gateway endpoints a session broadcasts to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use coup_domain::{ChatBotEndpoint, ChatMessage, ChatMessageId, DomainError, Platform, SessionId};

use crate::application::ports::ChatQueuePort;

pub struct SqliteChatRepo {
    pool: SqlitePool,
}

impl SqliteChatRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn platform_str(platform: Platform) -> &'static str {
        match platform {
            Platform::Discord => "discord",
            Platform::Slack => "slack",
            Platform::Llm => "llm",
        }
    }
}

#[async_trait]
impl ChatQueuePort for SqliteChatRepo {
    async fn enqueue(&self, mut message: ChatMessage) -> Result<ChatMessage, DomainError> {
        let json = serde_json::to_string(&message)
            .map_err(|e| DomainError::fatal(format!("serialize chat message: {e}")))?;
        let result = sqlx::query("INSERT INTO chat_messages (session_id, data_json) VALUES (?, ?)")
            .bind(message.session_id.to_string())
            .bind(json)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("enqueue chat message failed: {e}")))?;
        message.id = ChatMessageId(result.last_insert_rowid());
        Ok(message)
    }

    async fn peek(&self, session_id: SessionId) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = sqlx::query("SELECT id, data_json FROM chat_messages WHERE session_id = ? ORDER BY id ASC")
            .bind(session_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("peek chat queue failed: {e}")))?;
        rows.iter()
            .map(|row| {
                let json: String = row.get("data_json");
                let mut message: ChatMessage = serde_json::from_str(&json)
                    .map_err(|e| DomainError::fatal(format!("corrupt chat message row: {e}")))?;
                let id: i64 = row.get("id");
                message.id = ChatMessageId(id);
                Ok(message)
            })
            .collect()
    }

    async fn delete_snapshot(&self, ids: &[ChatMessageId]) -> Result<(), DomainError> {
        for id in ids {
            sqlx::query("DELETE FROM chat_messages WHERE id = ?")
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::transient(format!("delete chat message failed: {e}")))?;
        }
        Ok(())
    }

    async fn endpoints_for_session(&self, session_id: SessionId) -> Result<Vec<ChatBotEndpoint>, DomainError> {
        let rows = sqlx::query("SELECT data_json FROM chat_endpoints WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list endpoints failed: {e}")))?;
        rows.iter()
            .map(|row| {
                let json: String = row.get("data_json");
                serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt endpoint row: {e}")))
            })
            .filter(|endpoint: &Result<ChatBotEndpoint, DomainError>| {
                endpoint.as_ref().map(|e| e.is_active).unwrap_or(true)
            })
            .collect()
    }

    async fn upsert_endpoint(&self, endpoint: ChatBotEndpoint) -> Result<ChatBotEndpoint, DomainError> {
        let json = serde_json::to_string(&endpoint)
            .map_err(|e| DomainError::fatal(format!("serialize endpoint: {e}")))?;
        sqlx::query(
            "INSERT INTO chat_endpoints (session_id, platform, data_json) VALUES (?, ?, ?)
             ON CONFLICT(session_id, platform) DO UPDATE SET data_json = excluded.data_json",
        )
        .bind(endpoint.session_id.to_string())
        .bind(Self::platform_str(endpoint.platform))
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("upsert endpoint failed: {e}")))?;
        Ok(endpoint)
    }

    async fn touch_last_broadcast(
        &self,
        session_id: SessionId,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let row = sqlx::query("SELECT data_json FROM chat_endpoints WHERE session_id = ? AND platform = ?")
            .bind(session_id.to_string())
            .bind(Self::platform_str(platform))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("lookup endpoint failed: {e}")))?;
        let Some(row) = row else { return Ok(()) };
        let json: String = row.get("data_json");
        let mut endpoint: ChatBotEndpoint =
            serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt endpoint row: {e}")))?;
        endpoint.last_broadcast_at = Some(at);
        self.upsert_endpoint(endpoint).await.map(|_| ())
    }
}
