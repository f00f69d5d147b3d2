//! Phase Clock: a durable, idempotent one-shot scheduler backed by a
//! `phase_jobs` table, with an in-process `DashMap` guarding against a
//! poll tick re-dispatching a job whose handler is still running.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use sqlx::{Row, SqlitePool};

use coup_domain::{DomainError, SessionId};

use crate::application::ports::{PhaseFiredHandler, SchedulerPort};

pub struct PhaseClockScheduler {
    pool: SqlitePool,
    inflight: DashSet<SessionId>,
    misfire_grace: Duration,
}

impl PhaseClockScheduler {
    pub fn new(pool: SqlitePool, misfire_grace: Duration) -> Self {
        Self { pool, inflight: DashSet::new(), misfire_grace }
    }

    /// Polls `phase_jobs` for due sessions and dispatches each to
    /// `handler`, skipping any session already being processed by an
    /// earlier tick. Intended to run in a dedicated background task at
    /// a fixed interval (see `run_loop`). A job overdue by more than
    /// `misfire_grace` still fires — it is logged as a misfire rather
    /// than dropped.
    pub async fn tick(&self, handler: &dyn PhaseFiredHandler) -> Result<(), DomainError> {
        let now = Utc::now();
        let rows = sqlx::query("SELECT session_id, run_at FROM phase_jobs WHERE run_at <= ?")
            .bind(now.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("poll phase_jobs failed: {e}")))?;

        for row in rows {
            let id: String = row.get("session_id");
            let Ok(uuid) = uuid::Uuid::parse_str(&id) else { continue };
            let session_id = SessionId::from_uuid(uuid);
            if !self.inflight.insert(session_id) {
                continue;
            }

            let run_at: String = row.get("run_at");
            if let Ok(run_at) = DateTime::parse_from_rfc3339(&run_at) {
                let overdue = now.signed_duration_since(run_at).to_std().unwrap_or_default();
                if overdue > self.misfire_grace {
                    tracing::warn!(
                        %session_id,
                        overdue_seconds = overdue.as_secs(),
                        "phase job misfired, firing late"
                    );
                }
            }

            handler.on_phase_fired(session_id).await;
            self.inflight.remove(&session_id);
        }
        Ok(())
    }

    /// Runs `tick` forever on `poll_interval`, logging (not panicking)
    /// on transient polling failures so one bad tick never kills the
    /// clock.
    pub async fn run_loop(
        self: Arc<Self>,
        handler: Arc<dyn PhaseFiredHandler>,
        poll_interval: Duration,
    ) {
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            interval.tick().await;
            if let Err(err) = self.tick(handler.as_ref()).await {
                tracing::error!(error = %err, "phase clock poll failed");
            }
        }
    }
}

#[async_trait::async_trait]
impl SchedulerPort for PhaseClockScheduler {
    async fn schedule_next(&self, session_id: SessionId, run_at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO phase_jobs (session_id, run_at) VALUES (?, ?)
             ON CONFLICT(session_id) DO UPDATE SET run_at = excluded.run_at",
        )
        .bind(session_id.to_string())
        .bind(run_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::transient(format!("schedule phase job failed: {e}")))?;
        Ok(())
    }

    async fn cancel(&self, session_id: SessionId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM phase_jobs WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("cancel phase job failed: {e}")))?;
        self.inflight.remove(&session_id);
        Ok(())
    }

    /// Startup bootstrap: nothing to do beyond letting the next `tick`
    /// run — every overdue row is already `run_at <= now` and will be
    /// picked up and fired on the first poll, honoring the misfire
    /// grace policy of "still fires, just late".
    async fn recover_on_startup(&self) -> Result<(), DomainError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS c FROM phase_jobs WHERE run_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::transient(format!("count overdue phase jobs failed: {e}")))?
            .get("c");
        if count > 0 {
            tracing::info!(overdue = count, "recovering overdue phase jobs on startup");
        }
        Ok(())
    }
}
