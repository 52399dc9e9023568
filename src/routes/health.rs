use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
    database: &'static str,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthData>) {
    let status = match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let health_data = HealthData {
        status: status.as_u16(),
        database: if status.is_success() { "ok" } else { "unreachable" },
    };
    (status, Json(health_data))
}
