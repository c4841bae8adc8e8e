use crate::state::AppState;
use aq_utils::time::now_timestamp;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub environment: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: now_timestamp(),
        environment: state.config.environment.clone(),
    })
}
