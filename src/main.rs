use std::sync::Arc;

use agila::app::{memory_state, router, AppState};
use agila::config::{config, StoreBackend};
use agila::database::{DatabaseManager, Fixture, PgStore};
use tracing_subscriber::EnvFilter;

const DEMO_FIXTURE: &str = include_str!("../fixtures/demo.json");

async fn state() -> anyhow::Result<AppState> {
    let config = config();
    match config.store.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::pool().await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(AppState::new(Arc::new(PgStore::new(pool))))
        }
        StoreBackend::Memory => {
            let fixture = match &config.store.seed_file {
                Some(path) => Fixture::from_path(path)?,
                None => Fixture::from_json(DEMO_FIXTURE)?,
            };
            Ok(memory_state(fixture).await?)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AGILA_STORE, etc.
    let _ = dotenvy::dotenv();

    let config = config();

    // TraceLayer spans are emitted at debug level
    let default_filter = if config.server.enable_request_logging {
        "info,tower_http=debug"
    } else {
        "info,tower_http=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting Agila in {:?} mode with {:?} store", config.environment, config.store.backend);

    let app = router(state().await?);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Agila listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    DatabaseManager::close().await;
    Ok(())
}
