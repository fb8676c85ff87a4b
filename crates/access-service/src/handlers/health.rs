//! Health check handlers.
//!
//! Provides health check endpoints for liveness and readiness probes.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - checks the session store

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Returns a simple "OK" response to indicate the process is running.
/// Does NOT check any dependencies - failure means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Exercises the session store with a read to confirm the service can
/// handle traffic. With the in-memory store this cannot fail, but the
/// probe keeps the same shape for stores that can.
#[tracing::instrument(skip_all, name = "access.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.lookup_by_token("readiness-probe").await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                store: Some("healthy"),
            }),
        ),
        Err(e) => {
            // Log the actual error server-side; the response stays generic
            tracing::warn!("Readiness check failed: store error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready",
                    store: Some("unhealthy"),
                }),
            )
        }
    }
}
