//! AirNow current-observation client.
//!
//! AirNow reports an index per reporting area rather than a raw
//! concentration. PM2.5 readings are converted back to a concentration
//! through the breakpoint table so the rest of the pipeline can treat
//! them like any other provider's; other pollutants keep their index
//! value with the unit `AQI`.

use super::{PollutantSource, UpstreamError};
use crate::breakpoint::concentration_for_index;
use crate::measurement::{sort_newest_first, Coordinate, Measurement};
use crate::parameter::{Parameter, DEFAULT_UNIT, INDEX_UNIT};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

pub const AIRNOW_BASE_URL: &str = "https://www.airnowapi.org";
const METERS_PER_MILE: f64 = 1_609.344;
const MIN_DISTANCE_MILES: u32 = 1;
const MAX_DISTANCE_MILES: u32 = 50;

pub struct AirNowSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AirNowSource {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        AirNowSource {
            client,
            base_url: AIRNOW_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn observations_url(&self, center: Coordinate, radius_meters: u32) -> String {
        format!(
            concat!(
                "{}/aq/observation/latLong/current/?format=application/json",
                "&latitude={}&longitude={}&distance={}&API_KEY={}"
            ),
            self.base_url,
            center.latitude,
            center.longitude,
            distance_miles(radius_meters),
            self.api_key
        )
    }
}

/// Search distance in whole miles, rounded up.
pub fn distance_miles(radius_meters: u32) -> u32 {
    let miles = (radius_meters as f64 / METERS_PER_MILE).ceil() as u32;
    miles.clamp(MIN_DISTANCE_MILES, MAX_DISTANCE_MILES)
}

#[async_trait]
impl PollutantSource for AirNowSource {
    fn id(&self) -> &'static str {
        "airnow"
    }

    async fn fetch_measurements(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Measurement>, UpstreamError> {
        let url = self.observations_url(center, radius_meters);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status_code: status.as_u16(),
                body,
            });
        }
        normalize_response(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Observation {
    date_observed: String,
    hour_observed: u32,
    #[serde(default)]
    local_time_zone: Option<String>,
    #[serde(default)]
    reporting_area: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    parameter_name: String,
    #[serde(rename = "AQI")]
    aqi: i32,
}

/// UTC offset in hours for the zone abbreviations AirNow reports.
fn zone_offset_hours(zone: &str) -> Option<i32> {
    match zone.trim().to_ascii_uppercase().as_str() {
        "UTC" | "GMT" => Some(0),
        "AST" => Some(-4),
        "EDT" => Some(-4),
        "EST" => Some(-5),
        "CDT" => Some(-5),
        "CST" => Some(-6),
        "MDT" => Some(-6),
        "MST" => Some(-7),
        "PDT" => Some(-7),
        "PST" => Some(-8),
        "AKDT" => Some(-8),
        "AKST" => Some(-9),
        "HST" => Some(-10),
        _ => None,
    }
}

impl Observation {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(self.date_observed.trim(), "%Y-%m-%d").ok()?;
        let local = date.and_hms_opt(self.hour_observed, 0, 0)?;
        let offset_hours = zone_offset_hours(self.local_time_zone.as_deref()?)?;
        let offset = FixedOffset::east_opt(offset_hours * 3600)?;
        offset
            .from_local_datetime(&local)
            .single()
            .map(|t| t.with_timezone(&Utc))
    }

    fn into_measurement(self) -> Option<Measurement> {
        // AirNow reports -1 for an hour without a valid index.
        if self.aqi < 0 {
            return None;
        }
        let parameter: Parameter = self.parameter_name.parse().ok()?;
        let index = self.aqi.min(u16::MAX as i32) as u16;
        let (value, unit) = match parameter {
            Parameter::Pm25 => (concentration_for_index(index), DEFAULT_UNIT),
            _ => (index as f64, INDEX_UNIT),
        };
        let timestamp = self.timestamp();
        let coordinate = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        Some(Measurement {
            parameter,
            value,
            unit: unit.to_string(),
            timestamp,
            coordinate,
            site_id: self.reporting_area,
        })
    }
}

/// Normalize an AirNow observation body, which must be a JSON array.
pub fn normalize_response(body: &str) -> Result<Vec<Measurement>, UpstreamError> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

    let mut measurements: Vec<Measurement> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Observation>(record) {
            Ok(observation) => observation.into_measurement(),
            Err(e) => {
                log::debug!("[AQ Debug] skipping unreadable AirNow record: {}", e);
                None
            }
        })
        .collect();
    sort_newest_first(&mut measurements);
    Ok(measurements)
}
