use crate::parameter::Parameter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    /// Formats as `lat,lng`, the form providers accept as a query value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// One pollutant reading, normalized from whatever shape the provider used.
///
/// `coordinate` and `timestamp` are optional because not every provider
/// record carries them; the aggregator skips readings without a coordinate.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub parameter: Parameter,
    pub value: f64,
    pub unit: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub coordinate: Option<Coordinate>,
    /// Provider-supplied site identifier, when the provider has one.
    pub site_id: Option<String>,
}

/// Stable sort putting the most recent readings first and undated readings last.
///
/// Readings with equal timestamps keep their provider order.
pub fn sort_newest_first(measurements: &mut [Measurement]) {
    measurements.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
