//! OpenAQ v3 measurements client.
//!
//! Requests the latest measurements around a coordinate and normalizes
//! the result records into [`Measurement`]s. OpenAQ has returned the
//! `parameter` field both as a bare name and as an object with `name` and
//! `units`, so both are accepted.

use super::{clamp_radius, PollutantSource, UpstreamError};
use crate::measurement::{sort_newest_first, Coordinate, Measurement};
use crate::parameter::{Parameter, DEFAULT_UNIT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

pub const OPENAQ_BASE_URL: &str = "https://api.openaq.org";
pub const MIN_RADIUS_METERS: u32 = 1_000;
pub const MAX_RADIUS_METERS: u32 = 25_000;
const RESULT_LIMIT: u32 = 50;
/// OpenAQ parameter ids for pm25, pm10, o3, no2, so2 and co.
const PARAMETER_IDS: &str = "2,3,7,10,1,6";

pub struct OpenAqSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAqSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        OpenAqSource {
            client,
            base_url: OPENAQ_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Point the client at another host, e.g. a local stand-in during tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn measurements_url(&self, center: Coordinate, radius_meters: u32) -> String {
        format!(
            concat!(
                "{}/v3/measurements?coordinates={}&radius={}&limit={}",
                "&order_by=datetime&sort=desc&parameters_id={}"
            ),
            self.base_url,
            center,
            clamp_radius(radius_meters, MIN_RADIUS_METERS, MAX_RADIUS_METERS),
            RESULT_LIMIT,
            PARAMETER_IDS
        )
    }
}

#[async_trait]
impl PollutantSource for OpenAqSource {
    fn id(&self) -> &'static str {
        "openaq_v3"
    }

    async fn fetch_measurements(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Measurement>, UpstreamError> {
        let url = self.measurements_url(center, radius_meters);
        log::debug!("[AQ Debug] GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }
        let response = request
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
struct MeasurementsResponse {
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParameterField {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        units: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SiteId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct DateTimeField {
    utc: String,
}

#[derive(Debug, Deserialize)]
struct CoordinatesField {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeasurementRecord {
    parameter: ParameterField,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default, alias = "date")]
    datetime: Option<DateTimeField>,
    #[serde(default)]
    coordinates: Option<CoordinatesField>,
    #[serde(default, alias = "locationsId", alias = "location_id")]
    location_id: Option<SiteId>,
}

impl MeasurementRecord {
    fn into_measurement(self) -> Option<Measurement> {
        let (name, units) = match self.parameter {
            ParameterField::Name(name) => (name, None),
            ParameterField::Detailed { name, units } => (name, units),
        };
        let parameter: Parameter = match name.parse() {
            Ok(parameter) => parameter,
            Err(_) => {
                log::debug!("[AQ Debug] skipping unsupported parameter {}", name);
                return None;
            }
        };
        let value = self.value.filter(|v| v.is_finite())?;
        let unit = self
            .unit
            .or(units)
            .unwrap_or_else(|| DEFAULT_UNIT.to_string());
        let timestamp = self
            .datetime
            .and_then(|d| DateTime::parse_from_rfc3339(&d.utc).ok())
            .map(|d| d.with_timezone(&Utc));
        let coordinate = self.coordinates.and_then(|c| match (c.latitude, c.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        });
        let site_id = self.location_id.map(|id| match id {
            SiteId::Number(n) => n.to_string(),
            SiteId::Text(s) => s,
        });
        Some(Measurement {
            parameter,
            value,
            unit,
            timestamp,
            coordinate,
            site_id,
        })
    }
}

/// Normalize an OpenAQ measurements body.
///
/// A body that is not a JSON object is malformed. A missing `results`
/// array is an empty result. Records with an unknown parameter, a null
/// value or an unreadable shape are skipped.
pub fn normalize_response(body: &str) -> Result<Vec<Measurement>, UpstreamError> {
    let response: MeasurementsResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

    let mut measurements: Vec<Measurement> = response
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<MeasurementRecord>(record) {
            Ok(record) => record.into_measurement(),
            Err(e) => {
                log::debug!("[AQ Debug] skipping unreadable OpenAQ record: {}", e);
                None
            }
        })
        .collect();
    sort_newest_first(&mut measurements);
    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;

    static BODY: &str = r#"{
        "meta": { "found": 4 },
        "results": [
            {
                "parameter": { "id": 2, "name": "pm25", "units": "µg/m³" },
                "value": 18.2,
                "datetime": { "utc": "2024-05-01T14:00:00Z", "local": "2024-05-01T10:00:00-04:00" },
                "coordinates": { "latitude": 40.7128, "longitude": -74.006 },
                "locationsId": 1234
            },
            {
                "parameter": "pm10",
                "value": 30.0,
                "unit": "µg/m³",
                "date": { "utc": "2024-05-01T15:00:00Z" },
                "coordinates": { "latitude": 40.7128, "longitude": -74.006 },
                "location_id": "site-9"
            },
            {
                "parameter": { "name": "temperature", "units": "c" },
                "value": 20.0
            },
            {
                "parameter": "o3",
                "value": null
            }
        ]
    }"#;

    #[test]
    fn normalizes_both_parameter_shapes() {
        let measurements = normalize_response(BODY).unwrap();
        assert_eq!(measurements.len(), 2);

        // pm10 is newer, so it sorts first.
        assert_eq!(measurements[0].parameter, Parameter::Pm10);
        assert_eq!(measurements[0].site_id.as_deref(), Some("site-9"));

        let pm25 = &measurements[1];
        assert_eq!(pm25.parameter, Parameter::Pm25);
        assert_eq!(pm25.value, 18.2);
        assert_eq!(pm25.unit, "µg/m³");
        assert_eq!(pm25.site_id.as_deref(), Some("1234"));
        assert_eq!(pm25.coordinate, Some(Coordinate::new(40.7128, -74.006)));
        assert_eq!(
            pm25.timestamp.map(|t| t.to_rfc3339()),
            Some("2024-05-01T14:00:00+00:00".to_string())
        );
    }

    #[test]
    fn missing_results_is_empty() {
        assert_eq!(normalize_response("{}").unwrap(), vec![]);
        assert_eq!(normalize_response(r#"{"results": null}"#).unwrap(), vec![]);
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            normalize_response("<html>gateway</html>"),
            Err(UpstreamError::MalformedResponse(_))
        ));
        assert!(matches!(
            normalize_response("[1, 2]"),
            Err(UpstreamError::MalformedResponse(_))
        ));
    }

    #[test]
    fn url_clamps_radius() {
        let source = OpenAqSource::new(Client::new(), None).with_base_url("http://localhost:9/");
        let url = source.measurements_url(Coordinate::new(40.7, -74.0), 100_000);
        assert_eq!(
            url,
            concat!(
                "http://localhost:9/v3/measurements?coordinates=40.7,-74&radius=25000&limit=50",
                "&order_by=datetime&sort=desc&parameters_id=2,3,7,10,1,6"
            )
        );
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let source = OpenAqSource::new(Client::new(), Some("  ".to_string()));
        assert!(source.api_key.is_none());
    }
}
