use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, Fixture, PgStore};

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[arg(help = "JSON fixture (contracts, clients, lawyers, cases, works, payments, assignments)")]
    pub file: PathBuf,

    #[arg(long, help = "Postgres URL (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Apply migrations before seeding")]
    pub migrate: bool,
}

pub async fn handle(args: SeedArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    // Parse before connecting so a bad file fails fast
    let fixture = Fixture::from_path(&args.file)?;
    let pool = super::connect(args.database_url).await?;
    if args.migrate {
        DatabaseManager::migrate(&pool).await?;
    }

    let store = PgStore::new(pool.clone());
    let summary = fixture.apply(&store).await?;
    pool.close().await;

    output_success(
        output_format,
        &format!(
            "Seeded {} records and {} assignments from {}",
            summary.records,
            summary.assignments,
            args.file.display()
        ),
        Some(json!({ "records": summary.records, "assignments": summary.assignments })),
    )
}
