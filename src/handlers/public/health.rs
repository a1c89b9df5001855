use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;

/// GET /health - liveness plus a round trip to the record store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store().backend();

    match state.store().health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": backend,
                    "version": env!("CARGO_PKG_VERSION"),
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed on {} store: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": backend,
                    }
                })),
            )
        }
    }
}
