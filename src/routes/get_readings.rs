use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::{
    readings::{self, TimeRange},
    Config, ReadingView,
};

// ---

pub fn router() -> Router<(SqlitePool, Config)> {
    // ---
    Router::new().route("/api/readings", get(handler))
}

async fn handler(
    Query(params): Query<Vec<(String, String)>>,
    State((pool, config)): State<(SqlitePool, Config)>,
) -> impl IntoResponse {
    // ---
    let range = TimeRange::from_query(&params);
    info!("GET /api/readings - time_range={:?}", range);

    match readings::list_readings(&pool, range, Utc::now()).await {
        Ok(rows) => {
            let views: Vec<ReadingView> = rows
                .into_iter()
                .map(|r| r.annotate(&config.thresholds))
                .collect();
            info!("Returning {} readings", views.len());
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(e) => {
            error!("Failed to list readings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to load readings"),
            )
                .into_response()
        }
    }
}
