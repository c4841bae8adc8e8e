use crate::aqi::AqiCategory;
use crate::measurement::Coordinate;
use serde::{Deserialize, Serialize};

/// One aggregated observation site, as drawn on the map.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPoint {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: u16,
    pub category: AqiCategory,
    pub color: String,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

impl LocationPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Bounding box of a set of map points.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// A zero-area box around a single coordinate.
    pub fn around(coordinate: Coordinate) -> Self {
        Bounds {
            north: coordinate.latitude,
            south: coordinate.latitude,
            east: coordinate.longitude,
            west: coordinate.longitude,
        }
    }

    /// Min/max latitude and longitude over the points, or `None` when empty.
    pub fn enclosing(points: &[LocationPoint]) -> Option<Self> {
        let first = points.first()?;
        Some(
            points
                .iter()
                .skip(1)
                .fold(Bounds::around(first.coordinate()), |b, p| Bounds {
                    north: b.north.max(p.latitude),
                    south: b.south.min(p.latitude),
                    east: b.east.max(p.longitude),
                    west: b.west.min(p.longitude),
                }),
        )
    }
}
