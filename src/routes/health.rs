// src/routes/health.rs
//! Health check endpoint.
//!
//! `GET /health` reports whether the service is up and whether the readings
//! database answers a trivial query. Orchestrators and CI use it as a
//! readiness probe.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::Config;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Handle `GET /health`.
///
/// Returns 200 when `SELECT 1` succeeds and 503 otherwise.
async fn health(State((pool, _)): State<(SqlitePool, Config)>) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<(SqlitePool, Config)> {
    Router::new().route("/health", get(health))
}
