//! sqlx-backed `PlayerStorePort`.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coup_domain::{DomainError, PlayerGameState, SessionId, UserId};

use crate::application::ports::PlayerStorePort;

pub struct SqlitePlayerRepo {
    pool: SqlitePool,
}

impl SqlitePlayerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<PlayerGameState, DomainError> {
        let json: String = row.get("data_json");
        serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt player row: {e}")))
    }
}

#[async_trait]
impl PlayerStorePort for SqlitePlayerRepo {
    async fn join(&self, player: PlayerGameState) -> Result<PlayerGameState, DomainError> {
        let json = serde_json::to_string(&player)
            .map_err(|e| DomainError::fatal(format!("serialize player: {e}")))?;
        sqlx::query("INSERT INTO players (session_id, user_id, data_json) VALUES (?, ?, ?)")
            .bind(player.session_id.to_string())
            .bind(player.user_id.to_string())
            .bind(json)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("insert player failed: {e}")))?;
        Ok(player)
    }

    async fn get(&self, session_id: SessionId, user_id: &UserId) -> Result<PlayerGameState, DomainError> {
        let row = sqlx::query("SELECT data_json FROM players WHERE session_id = ? AND user_id = ?")
            .bind(session_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("select player failed: {e}")))?
            .ok_or_else(|| DomainError::not_found(format!("player {user_id} in session {session_id}")))?;
        Self::decode(&row)
    }

    async fn list_for_session(&self, session_id: SessionId) -> Result<Vec<PlayerGameState>, DomainError> {
        let rows = sqlx::query("SELECT data_json FROM players WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list players failed: {e}")))?;
        rows.iter().map(Self::decode).collect()
    }

    async fn update(&self, player: PlayerGameState) -> Result<PlayerGameState, DomainError> {
        let json = serde_json::to_string(&player)
            .map_err(|e| DomainError::fatal(format!("serialize player: {e}")))?;
        let result = sqlx::query("UPDATE players SET data_json = ? WHERE session_id = ? AND user_id = ?")
            .bind(json)
            .bind(player.session_id.to_string())
            .bind(player.user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("update player failed: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("player {} in session {}", player.user_id, player.session_id)));
        }
        Ok(player)
    }

    async fn remove(&self, session_id: SessionId, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM players WHERE session_id = ? AND user_id = ?")
            .bind(session_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("remove player failed: {e}")))?;
        Ok(())
    }

    async fn clear_pending_actions(&self, session_id: SessionId) -> Result<(), DomainError> {
        let rows = sqlx::query("SELECT data_json FROM players WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list players failed: {e}")))?;
        for row in rows {
            let mut player = Self::decode(&row)?;
            player.pending_action = None;
            player.upgrade_flags = None;
            self.update(player).await?;
        }
        Ok(())
    }
}
