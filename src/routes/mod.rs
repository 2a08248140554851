//! HTTP gateway for the readings service.
//!
//! Each sibling module owns one endpoint and exports a subrouter; this
//! gateway merges them and attaches the shared `(SqlitePool, Config)` state.

use axum::Router;
use sqlx::SqlitePool;

use crate::Config;

mod dashboard;
mod get_readings;
mod health;
mod receive_data;

// ---

pub fn router(pool: SqlitePool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(receive_data::router())
        .merge(dashboard::router())
        .merge(get_readings::router())
        .merge(health::router())
        .with_state((pool, config))
}
