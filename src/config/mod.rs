use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub table: TableConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// JSON fixture loaded into the memory backend at startup
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub session_expiry_hours: u64,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("AGILA_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Store overrides
        if let Ok(v) = env::var("AGILA_STORE") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.store.backend = StoreBackend::Memory,
                "postgres" | "pg" => self.store.backend = StoreBackend::Postgres,
                other => tracing::warn!("Unknown AGILA_STORE '{}', keeping {:?}", other, self.store.backend),
            }
        }
        if let Ok(v) = env::var("AGILA_SEED_FILE") {
            self.store.seed_file = Some(v);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Table overrides
        if let Ok(v) = env::var("TABLE_DEFAULT_PAGE_SIZE") {
            self.table.default_page_size = v.parse().unwrap_or(self.table.default_page_size);
        }
        if let Ok(v) = env::var("TABLE_MAX_PAGE_SIZE") {
            self.table.max_page_size = v.parse().unwrap_or(self.table.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("AGILA_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIE") {
            self.security.secure_cookie = v.parse().unwrap_or(self.security.secure_cookie);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                seed_file: None,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
                run_migrations: true,
            },
            table: TableConfig {
                default_page_size: 10,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: "agila-development-secret".to_string(),
                session_expiry_hours: 30 * 24, // 30 days
                cookie_name: "agila_session".to_string(),
                secure_cookie: false,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                seed_file: None,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
                run_migrations: true,
            },
            table: TableConfig {
                default_page_size: 10,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_expiry_hours: 30 * 24,
                cookie_name: "agila_session".to_string(),
                secure_cookie: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                enable_request_logging: false,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                seed_file: None,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
                run_migrations: false,
            },
            table: TableConfig {
                default_page_size: 10,
                max_page_size: 50,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_expiry_hours: 30 * 24,
                cookie_name: "agila_session".to_string(),
                secure_cookie: true,
                enable_cors: false,
                cors_origins: vec![],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
