pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "agila")]
#[command(about = "Agila CLI - database setup, seeding and offline table rendering")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the embedded database migrations")]
    Migrate(commands::migrate::MigrateArgs),

    #[command(about = "Load a JSON fixture into the database")]
    Seed(commands::seed::SeedArgs),

    #[command(about = "Sign in against a running server and print the session token")]
    Login(commands::login::LoginArgs),

    #[command(about = "Filter, sort and paginate a JSON array of rows")]
    Table(commands::table::TableArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate(args) => commands::migrate::handle(args, output_format).await,
        Commands::Seed(args) => commands::seed::handle(args, output_format).await,
        Commands::Login(args) => commands::login::handle(args, output_format).await,
        Commands::Table(args) => commands::table::handle(args, output_format),
    }
}
