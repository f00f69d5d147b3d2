//! sqlx-backed `SessionStorePort`. Sessions are stored as a JSON blob
//! (`data_json`) plus a few columns the query surface actually filters
//! on, the same shape used for the settings table elsewhere in this
//! crate.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coup_domain::{DomainError, Session, SessionId, SessionStatus};

use crate::application::ports::SessionStorePort;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn status_str(status: SessionStatus) -> &'static str {
        match status {
            SessionStatus::Waiting => "waiting",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<Session, DomainError> {
        let json: String = row.get("data_json");
        serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt session row: {e}")))
    }
}

#[async_trait]
impl SessionStorePort for SqliteSessionRepo {
    async fn create(&self, session: Session) -> Result<Session, DomainError> {
        let json = serde_json::to_string(&session)
            .map_err(|e| DomainError::fatal(format!("serialize session: {e}")))?;
        sqlx::query(
            "INSERT INTO sessions (id, discord_channel_id, slack_channel_id, status, data_json) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.discord_channel_id)
        .bind(&session.slack_channel_id)
        .bind(Self::status_str(session.status))
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("insert session failed: {e}")))?;
        Ok(session)
    }

    async fn get(&self, session_id: SessionId) -> Result<Session, DomainError> {
        let row = sqlx::query("SELECT data_json FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("select session failed: {e}")))?
            .ok_or_else(|| DomainError::not_found(format!("session {session_id}")))?;
        Self::decode(&row)
    }

    async fn list(&self) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query("SELECT data_json FROM sessions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list sessions failed: {e}")))?;
        rows.iter().map(Self::decode).collect()
    }

    async fn update(&self, session: Session) -> Result<Session, DomainError> {
        let json = serde_json::to_string(&session)
            .map_err(|e| DomainError::fatal(format!("serialize session: {e}")))?;
        let result = sqlx::query(
            "UPDATE sessions SET discord_channel_id = ?, slack_channel_id = ?, status = ?, data_json = ? WHERE id = ?",
        )
        .bind(&session.discord_channel_id)
        .bind(&session.slack_channel_id)
        .bind(Self::status_str(session.status))
        .bind(json)
        .bind(session.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("update session failed: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("session {}", session.id)));
        }
        Ok(session)
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("delete session failed: {e}")))?;
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query("SELECT data_json FROM sessions WHERE status = 'active'")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list active sessions failed: {e}")))?;
        rows.iter().map(Self::decode).collect()
    }

    async fn find_by_discord_channel(&self, channel_id: &str) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query("SELECT data_json FROM sessions WHERE discord_channel_id = ?")
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("lookup by discord channel failed: {e}")))?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_by_slack_channel(&self, channel_id: &str) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query("SELECT data_json FROM sessions WHERE slack_channel_id = ?")
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("lookup by slack channel failed: {e}")))?;
        row.as_ref().map(Self::decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coup_domain::SessionConfig;

    async fn repo() -> SqliteSessionRepo {
        let pool = crate::infrastructure::persistence::connect("sqlite::memory:").await.unwrap();
        SqliteSessionRepo::new(pool)
    }

    #[tokio::test]
    async fn create_then_get_round_trips_the_session() {
        let repo = repo().await;
        let session = Session::new(SessionId::new(), SessionConfig::default());
        let created = repo.create(session.clone()).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.name, session.name);
    }

    #[tokio::test]
    async fn get_on_an_unknown_id_is_not_found() {
        let repo = repo().await;
        let err = repo.get(SessionId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_on_an_unknown_id_is_not_found() {
        let repo = repo().await;
        let session = Session::new(SessionId::new(), SessionConfig::default());
        let err = repo.update(session).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_by_discord_channel_only_matches_a_bound_session() {
        let repo = repo().await;
        let mut session = Session::new(SessionId::new(), SessionConfig::default());
        session.discord_channel_id = Some("general".to_string());
        repo.create(session.clone()).await.unwrap();

        assert!(repo.find_by_discord_channel("general").await.unwrap().is_some());
        assert!(repo.find_by_discord_channel("off-topic").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_active_excludes_waiting_sessions() {
        let repo = repo().await;
        let mut active = Session::new(SessionId::new(), SessionConfig::default());
        active.status = SessionStatus::Active;
        repo.create(active.clone()).await.unwrap();
        repo.create(Session::new(SessionId::new(), SessionConfig::default())).await.unwrap();

        let actives = repo.list_active().await.unwrap();
        assert_eq!(actives.len(), 1);
        assert_eq!(actives[0].id, active.id);
    }
}
