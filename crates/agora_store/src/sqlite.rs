use agora_core::log::InteractionLog;
use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// SQLite-backed append-only audit log of chat interactions.
///
/// Written once per successfully processed query; the chat core never reads
/// it back.
#[derive(Clone)]
pub struct SqliteInteractionLog {
    pool: Pool<Sqlite>,
}

impl SqliteInteractionLog {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let log = Self { pool };
        log.migrate().await?;
        Ok(log)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                user_message TEXT NOT NULL,
                assistant_message TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create interactions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_interactions_session ON interactions(session_id)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create interactions session index")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl InteractionLog for SqliteInteractionLog {
    async fn append(
        &self,
        session_id: &str,
        user_message: &str,
        assistant_message: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO interactions (session_id, user_message, assistant_message, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(user_message)
        .bind(assistant_message)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .context("Failed to insert interaction")?;

        tracing::debug!("Recorded interaction for session '{}'", session_id);
        Ok(())
    }
}
