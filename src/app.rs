// app.rs - shared state and the route table

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config;
use crate::database::{DatabaseError, Fixture, MemoryStore, RecordStore};
use crate::handlers::{pages, public, records};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

/// In-memory store loaded with a fixture, for demos and tests
pub async fn memory_state(fixture: Fixture) -> Result<AppState, DatabaseError> {
    let store = MemoryStore::new();
    let summary = fixture.apply(&store).await?;
    tracing::info!(
        "Memory store seeded with {} records and {} assignments",
        summary.records,
        summary.assignments
    );
    Ok(AppState::new(Arc::new(store)))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Server-rendered pages, gated per handler
        .merge(page_routes())
        .merge(form_routes())
        // JSON API
        .merge(api_routes())
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health::health))
        .route("/login", get(public::login::login_page).post(public::login::login_submit))
        .route("/logout", post(public::login::logout))
        .route("/api/auth/login", post(public::login::api_login))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home::index))
        .route("/client/all", get(pages::clients::all_clients))
        .route("/client/:id", get(pages::clients::client_page))
        .route("/case/all", get(pages::cases::all_cases))
        .route("/case/:id", get(pages::cases::case_page))
        .route("/lawyer/all", get(pages::lawyers::all_lawyers))
        .route("/lawyer/:id", get(pages::lawyers::lawyer_page))
}

fn form_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/record/:kind/new",
            get(pages::records::new_record_page).post(records::forms::create_record),
        )
        .route(
            "/record/:kind/:id",
            get(pages::records::record_page).post(records::forms::update_record),
        )
        .route("/record/:kind/:id/delete", post(records::forms::delete_record))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(records::api::whoami))
        .route("/api/:kind", get(records::api::list_records).post(records::api::create_record))
        .route(
            "/api/:kind/:id",
            get(records::api::get_record)
                .put(records::api::update_record)
                .delete(records::api::delete_record),
        )
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
