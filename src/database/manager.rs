use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::config;
use crate::database::schema::SchemaError;
use crate::types::EntityKind;

/// Errors from the record store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} {id} already exists")]
    Conflict { kind: EntityKind, id: String },

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Seed error: {0}")]
    Seed(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        DatabaseError::NotFound { kind, id: id.to_string() }
    }
}

/// Lazily created connection pool for the practice database
pub struct DatabaseManager {
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager { pool: RwLock::new(None) })
    }

    /// Get the shared pool, connecting on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = manager.pool.write().await;
        // Another task may have connected while we waited for the write lock
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let pool = Self::connect(&Self::connection_string()?).await?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Open a standalone pool against an explicit URL (used by the CLI)
    pub async fn connect(url: &str) -> Result<PgPool, DatabaseError> {
        let settings = &config().database;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect(url)
            .await?;
        info!("Created database pool for: {}", Self::redacted(url));
        Ok(pool)
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into_string())
    }

    /// URL with the password masked, for logs
    fn redacted(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into_string()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Close the shared pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = Self::instance().pool.write().await.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
