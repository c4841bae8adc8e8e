pub mod air_quality;
pub mod error;
pub mod health;
pub mod user;

use crate::state::AppState;
use axum::routing::{delete, get};
use axum::Router;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/airquality/current", get(air_quality::current_handler))
        .route("/api/airquality/map", get(air_quality::map_handler))
        .route("/api/airquality/forecast", get(air_quality::forecast_handler))
        .route("/api/airquality/alerts", get(air_quality::alerts_handler))
        .route(
            "/api/user/profile",
            get(user::get_profile_handler).put(user::update_profile_handler),
        )
        .route("/api/user/account", delete(user::delete_account_handler))
        .with_state(state)
}
