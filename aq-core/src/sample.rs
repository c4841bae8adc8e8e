//! Bundled sample dataset used when the live provider is unavailable.
//!
//! The dataset is versioned JSON embedded at compile time. It carries a
//! current reading, a static forecast, map points and alerts; every
//! endpoint that falls back reshapes the relevant part into its own
//! response contract.

use crate::aqi::AqiCategory;
use crate::location::{Bounds, LocationPoint};
use crate::parameter::Parameter;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Embedded sample dataset.
pub static SAMPLE_JSON: &str = include_str!("../fixtures/air_quality_sample.json");

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sample dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sample dataset has no map points")]
    NoMapPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDataset {
    pub version: String,
    pub current_data: SampleCurrentReading,
    pub forecast: Vec<ForecastDay>,
    pub map_data: Vec<LocationPoint>,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCurrentReading {
    #[serde(default)]
    pub location: Option<SampleLocation>,
    pub pollutants: BTreeMap<Parameter, PollutantReading>,
    #[serde(default)]
    pub weather: Option<Weather>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// A single pollutant as shown in the current reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    pub value: Option<f64>,
    pub unit: String,
    pub description: String,
}

/// Fixed-shape weather block. Neither provider supplies weather, so live
/// responses carry [`Weather::placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    pub wind_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
    pub visibility: f64,
    pub uv_index: f64,
    pub description: String,
}

impl Weather {
    pub fn placeholder() -> Self {
        Weather {
            temperature: 22.0,
            humidity: 55.0,
            pressure: None,
            wind_speed: 3.2,
            wind_direction: None,
            visibility: 10.0,
            uv_index: 4.0,
            description: "Partly cloudy (placeholder)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub aqi: u16,
    pub category: AqiCategory,
    pub primary_pollutant: Parameter,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub aqi: Option<u16>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub affected_areas: Vec<String>,
}

impl SampleDataset {
    /// Parse and validate a sample document.
    pub fn parse(json: &str) -> Result<Self, SampleError> {
        let dataset: SampleDataset = serde_json::from_str(json)?;
        if dataset.map_data.is_empty() {
            return Err(SampleError::NoMapPoints);
        }
        Ok(dataset)
    }

    /// The dataset embedded in the binary, parsed once per process.
    pub fn bundled() -> &'static SampleDataset {
        static BUNDLED: OnceLock<SampleDataset> = OnceLock::new();
        BUNDLED.get_or_init(|| match SampleDataset::parse(SAMPLE_JSON) {
            Ok(dataset) => dataset,
            Err(e) => panic!("failed to parse bundled sample dataset: {}", e),
        })
    }

    pub fn pollutant_value(&self, parameter: Parameter) -> Option<f64> {
        self.current_data
            .pollutants
            .get(&parameter)
            .and_then(|p| p.value)
    }

    /// Extremes of the sample map points. Always `Some` for a parsed dataset.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(&self.map_data)
    }
}
