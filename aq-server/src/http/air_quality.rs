//! `/api/airquality/*` handlers.
//!
//! These never fail once the caller is authenticated: provider problems
//! are absorbed by the fallback service, and a profile store error only
//! costs the request its personalization.

use crate::auth::AuthUser;
use crate::recommendations::{personalized_recommendations, Recommendation};
use crate::service::{CurrentReport, DataSource, MapReport};
use crate::state::AppState;
use aq_core::aqi::AqiResult;
use aq_core::location::{Bounds, LocationPoint};
use aq_core::measurement::Coordinate;
use aq_core::parameter::Parameter;
use aq_core::sample::{Alert, ForecastDay, PollutantReading, Weather};
use aq_db::models::{AlertThreshold, HealthData, UserProfile};
use aq_utils::coordinates::{parse_query_number, resolve, ResolvedFrom};
use aq_utils::radius::{map_radius_meters, CURRENT_RADIUS_METERS};
use aq_utils::time::{format_timestamp, now_timestamp};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query values stay strings so a malformed number degrades to "absent"
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Map radius in kilometers.
    pub radius: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub resolved_from: ResolvedFrom,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentResponse {
    pub aqi: AqiResult,
    pub pollutants: BTreeMap<Parameter, PollutantReading>,
    pub weather: Weather,
    pub timestamp: String,
    pub data_source: DataSource,
    pub personalized_recommendations: Vec<Recommendation>,
    pub last_updated: String,
    pub location: ResolvedLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub map_data: Vec<LocationPoint>,
    pub bounds: Bounds,
    pub last_updated: String,
    pub data_source: DataSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastDay>,
    pub model: &'static str,
    pub accuracy: f64,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub user_threshold: AlertThreshold,
    /// Lowest index at which the user's threshold is reached.
    pub user_threshold_aqi: u16,
    pub last_checked: String,
}

impl CurrentResponse {
    pub fn new(
        report: CurrentReport,
        location: ResolvedLocation,
        health: Option<&HealthData>,
    ) -> Self {
        let now = now_timestamp();
        CurrentResponse {
            personalized_recommendations: personalized_recommendations(
                health,
                report.reading.aqi.value,
            ),
            aqi: report.reading.aqi,
            pollutants: report.reading.pollutants,
            weather: report.weather,
            timestamp: report
                .reading
                .timestamp
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| now.clone()),
            data_source: report.data_source,
            last_updated: now,
            location,
        }
    }
}

impl From<MapReport> for MapResponse {
    fn from(report: MapReport) -> Self {
        MapResponse {
            map_data: report.points,
            bounds: report.bounds,
            last_updated: now_timestamp(),
            data_source: report.data_source,
        }
    }
}

fn load_profile(state: &AppState, user: &AuthUser) -> Option<UserProfile> {
    match state.profiles.get_profile(&user.user_id) {
        Ok(profile) => profile,
        Err(e) => {
            log::warn!("profile lookup for {} failed: {:#}", user.user_id, e);
            None
        }
    }
}

fn resolve_location(
    state: &AppState,
    query: &LocationQuery,
    profile: Option<&UserProfile>,
) -> ResolvedLocation {
    let (coordinate, resolved_from) = resolve(
        query.lat.as_deref(),
        query.lng.as_deref(),
        profile.and_then(UserProfile::location),
        state.config.default_coordinate,
    );
    ResolvedLocation {
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        resolved_from,
    }
}

pub async fn current_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LocationQuery>,
) -> Json<CurrentResponse> {
    let profile = load_profile(&state, &user);
    let location = resolve_location(&state, &query, profile.as_ref());
    let center = Coordinate::new(location.latitude, location.longitude);

    let report = state.service.current(center, CURRENT_RADIUS_METERS).await;
    Json(CurrentResponse::new(
        report,
        location,
        profile.as_ref().map(|p| &p.health_data),
    ))
}

pub async fn map_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LocationQuery>,
) -> Json<MapResponse> {
    let profile = load_profile(&state, &user);
    let location = resolve_location(&state, &query, profile.as_ref());
    let center = Coordinate::new(location.latitude, location.longitude);
    let radius = map_radius_meters(parse_query_number(query.radius.as_deref()));

    Json(state.service.map(center, radius).await.into())
}

pub async fn forecast_handler(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Json<ForecastResponse> {
    Json(ForecastResponse {
        forecast: state.service.forecast().to_vec(),
        model: "placeholder_time_series",
        accuracy: 0.75,
        last_updated: now_timestamp(),
    })
}

pub async fn alerts_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<AlertsResponse> {
    let user_threshold = load_profile(&state, &user)
        .map(|p| p.preferences.alert_threshold)
        .unwrap_or_default();
    Json(AlertsResponse {
        alerts: state.service.alerts().to_vec(),
        user_threshold,
        user_threshold_aqi: user_threshold.floor(),
        last_checked: now_timestamp(),
    })
}
