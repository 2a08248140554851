use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::{readings, Config, NewReading, PayloadError};

// ---

pub fn router() -> Router<(SqlitePool, Config)> {
    // ---
    Router::new().route("/receive_data", post(handler))
}

/// Handle `POST /receive_data` from a sensor device.
async fn handler(
    State((pool, _config)): State<(SqlitePool, Config)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    // ---
    let payload = match payload {
        Ok(Json(value)) => value,
        Err(JsonRejection::MissingJsonContentType(_)) => {
            warn!("POST /receive_data - rejected non-JSON content type");
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Media Type: Did not attempt to load JSON data because the \
                 request Content-Type was not 'application/json'.",
            );
        }
        Err(e) => {
            debug!("POST /receive_data - unreadable body: {}", e);
            return (StatusCode::BAD_REQUEST, "No JSON data received");
        }
    };

    let reading = match NewReading::from_payload(&payload) {
        Ok(reading) => reading,
        Err(PayloadError::Empty) => {
            debug!("POST /receive_data - empty payload");
            return (StatusCode::BAD_REQUEST, "No JSON data received");
        }
        Err(PayloadError::Invalid) => {
            debug!("POST /receive_data - invalid payload: {}", payload);
            return (StatusCode::BAD_REQUEST, "Invalid data");
        }
    };

    match readings::insert_reading(&pool, &reading, Utc::now()).await {
        Ok(id) => {
            info!(
                "Stored reading {} for '{}' at '{}': {}",
                id, reading.plant_name, reading.location, reading.moisture_value
            );
            (StatusCode::OK, "Data received and stored")
        }
        Err(e) => {
            error!("Failed to store reading: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store data")
        }
    }
}
