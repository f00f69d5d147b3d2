//! sqlx-backed `TurnResultStorePort` — append-only turn history.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coup_domain::{DomainError, SessionId, TurnResult};

use crate::application::ports::TurnResultStorePort;

pub struct SqliteTurnResultRepo {
    pool: SqlitePool,
}

impl SqliteTurnResultRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TurnResultStorePort for SqliteTurnResultRepo {
    async fn save(&self, result: TurnResult) -> Result<TurnResult, DomainError> {
        let json = serde_json::to_string(&result)
            .map_err(|e| DomainError::fatal(format!("serialize turn result: {e}")))?;
        sqlx::query("INSERT INTO turn_results (id, session_id, turn_number, data_json) VALUES (?, ?, ?, ?)")
            .bind(result.id.to_string())
            .bind(result.session_id.to_string())
            .bind(result.turn_number)
            .bind(json)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("insert turn result failed: {e}")))?;
        Ok(result)
    }

    async fn list_for_session(&self, session_id: SessionId) -> Result<Vec<TurnResult>, DomainError> {
        let rows = sqlx::query(
            "SELECT data_json FROM turn_results WHERE session_id = ? ORDER BY turn_number ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("list turn results failed: {e}")))?;
        rows.iter()
            .map(|row| {
                let json: String = row.get("data_json");
                serde_json::from_str(&json).map_err(|e| DomainError::fatal(format!("corrupt turn result row: {e}")))
            })
            .collect()
    }
}
