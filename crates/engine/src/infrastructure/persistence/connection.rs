//! SQLite connection pool + schema bootstrap.

use sqlx::SqlitePool;

use coup_domain::DomainError;

pub async fn connect(database_url: &str) -> Result<SqlitePool, DomainError> {
    let pool = SqlitePool::connect(database_url)
        .await
        .map_err(|e| DomainError::transient(format!("db connect failed: {e}")))?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), DomainError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            discord_channel_id TEXT,
            slack_channel_id TEXT,
            status TEXT NOT NULL,
            data_json TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS players (
            session_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            data_json TEXT NOT NULL,
            PRIMARY KEY (session_id, user_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS reactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            turn_number INTEGER NOT NULL,
            resolved INTEGER NOT NULL DEFAULT 0,
            data_json TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_reactions_turn ON reactions(session_id, turn_number, resolved)",
        r#"
        CREATE TABLE IF NOT EXISTS turn_results (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            turn_number INTEGER NOT NULL,
            data_json TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_turn_results_session ON turn_results(session_id, turn_number)",
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            data_json TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id)",
        r#"
        CREATE TABLE IF NOT EXISTS chat_endpoints (
            session_id TEXT NOT NULL,
            platform TEXT NOT NULL,
            data_json TEXT NOT NULL,
            PRIMARY KEY (session_id, platform)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS phase_jobs (
            session_id TEXT PRIMARY KEY,
            run_at TEXT NOT NULL
        )
        "#,
    ];

    for stmt in statements {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| DomainError::fatal(format!("migration failed: {e}")))?;
    }
    Ok(())
}
