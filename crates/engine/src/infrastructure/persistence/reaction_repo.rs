//! sqlx-backed `ReactionStorePort`. `id` is an autoincrement primary
//! key assigned by SQLite on insert, giving the resolver's "earliest
//! reaction wins" tie-break a monotonic, storage-assigned ordering.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coup_domain::action::Reaction;
use coup_domain::{DomainError, ReactionId, SessionId};

use crate::application::ports::ReactionStorePort;

pub struct SqliteReactionRepo {
    pool: SqlitePool,
}

impl SqliteReactionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<Reaction, DomainError> {
        let json: String = row.get("data_json");
        let mut reaction: Reaction =
            serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt reaction row: {e}")))?;
        let id: i64 = row.get("id");
        reaction.id = ReactionId(id);
        Ok(reaction)
    }
}

#[async_trait]
impl ReactionStorePort for SqliteReactionRepo {
    async fn add(&self, mut reaction: Reaction) -> Result<Reaction, DomainError> {
        let json = serde_json::to_string(&reaction)
            .map_err(|e| DomainError::fatal(format!("serialize reaction: {e}")))?;
        let result = sqlx::query(
            "INSERT INTO reactions (session_id, turn_number, resolved, data_json) VALUES (?, ?, 0, ?)",
        )
        .bind(reaction.session_id.to_string())
        .bind(reaction.turn_number)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("insert reaction failed: {e}")))?;
        reaction.id = ReactionId(result.last_insert_rowid());
        Ok(reaction)
    }

    async fn list_unresolved_for_turn(
        &self,
        session_id: SessionId,
        turn_number: u32,
    ) -> Result<Vec<Reaction>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, data_json FROM reactions WHERE session_id = ? AND turn_number = ? AND resolved = 0",
        )
        .bind(session_id.to_string())
        .bind(turn_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("list reactions failed: {e}")))?;
        rows.iter().map(Self::decode).collect()
    }

    async fn lock_all_for_turn(&self, session_id: SessionId, turn_number: u32) -> Result<(), DomainError> {
        let rows = sqlx::query("SELECT id, data_json FROM reactions WHERE session_id = ? AND turn_number = ?")
            .bind(session_id.to_string())
            .bind(turn_number)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("list reactions failed: {e}")))?;
        for row in rows {
            let mut reaction = Self::decode(&row)?;
            reaction.is_locked = true;
            let json = serde_json::to_string(&reaction)
                .map_err(|e| DomainError::fatal(format!("serialize reaction: {e}")))?;
            sqlx::query("UPDATE reactions SET data_json = ? WHERE id = ?")
                .bind(json)
                .bind(reaction.id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::transient(format!("lock reaction failed: {e}")))?;
        }
        Ok(())
    }

    async fn mark_resolved(&self, reaction_id: ReactionId) -> Result<(), DomainError> {
        sqlx::query("UPDATE reactions SET resolved = 1 WHERE id = ?")
            .bind(reaction_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("mark reaction resolved failed: {e}")))?;
        Ok(())
    }
}
