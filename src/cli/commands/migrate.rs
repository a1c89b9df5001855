use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[arg(long, help = "Postgres URL (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,
}

pub async fn handle(args: MigrateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = super::connect(args.database_url).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    output_success(output_format, "Migrations applied", Some(json!({ "migrated": true })))
}
