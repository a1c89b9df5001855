pub mod login;
pub mod migrate;
pub mod seed;
pub mod table;

use sqlx::PgPool;

use crate::database::DatabaseManager;

/// Pool for the offline commands: `--database-url`, else DATABASE_URL
pub(crate) async fn connect(database_url: Option<String>) -> anyhow::Result<PgPool> {
    match database_url {
        Some(url) => Ok(DatabaseManager::connect(&url).await?),
        None => Ok(DatabaseManager::pool().await?),
    }
}
