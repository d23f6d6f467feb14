use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Foreign key from `participant.event_id`; the only one reported as a missing event.
pub(crate) const PARTICIPANT_EVENT_FK: &str = "participant_event_id_fkey";

const SCHEMA_LOCK_KEY: i64 = 0x6576_656e_7473;

/// Tables created at startup when absent. Statements run one at a time in a single transaction.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "user" (
        id UUID PRIMARY KEY,
        email VARCHAR(120) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event (
        id UUID PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        date TIMESTAMP NOT NULL,
        user_id UUID NOT NULL REFERENCES "user"(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS participant (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES "user"(id),
        event_id UUID NOT NULL
            CONSTRAINT participant_event_id_fkey REFERENCES event(id) ON DELETE CASCADE,
        CONSTRAINT participant_user_event_key UNIQUE (user_id, event_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS event_user_id_idx ON event (user_id)",
];

/// The backend selected by `DATABASE_URL`
#[derive(Clone)]
pub enum Database {
    Postgres(Arc<PgStore>),
    Memory(Arc<MemoryStore>),
}

impl Database {
    /// Open the configured store and make sure its schema exists.
    pub async fn connect(config: &AppConfig) -> Result<Self, DatabaseError> {
        if config.uses_memory_store() {
            info!("Using in-memory store");
            return Ok(Database::Memory(Arc::new(MemoryStore::new())));
        }

        let raw = config.database.url.as_str();
        let url = url::Url::parse(raw).map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(raw)
            .await?;

        info!(
            "Connected to Postgres at {}{}",
            url.host_str().unwrap_or("localhost"),
            url.path()
        );

        ensure_schema(&pool).await?;
        Ok(Database::Postgres(Arc::new(PgStore::new(pool))))
    }

    pub async fn close(&self) {
        if let Database::Postgres(store) = self {
            store.pool().close().await;
            info!("Closed database pool");
        }
    }
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;

    // Concurrent CREATE TABLE IF NOT EXISTS can still collide in pg_type
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    info!("Database schema ready");
    Ok(())
}

/// Map constraint violations raised by Postgres onto the store's error taxonomy.
pub(crate) fn map_constraint_error(err: sqlx::Error, conflict: &str) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::Conflict(conflict.to_string());
        }
        if db_err.is_foreign_key_violation() && db_err.constraint() == Some(PARTICIPANT_EVENT_FK) {
            return DatabaseError::NotFound(crate::database::repository::EVENT_NOT_FOUND.to_string());
        }
    }
    DatabaseError::Sqlx(err)
}
