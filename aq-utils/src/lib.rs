//! Shared utility functions for AQ crates.

/// Request coordinate helpers
pub mod coordinates {
    use aq_core::measurement::Coordinate;
    use serde::{Deserialize, Serialize};

    /// Default center when neither the request nor the profile names one (New York City).
    pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    /// Where a resolved coordinate came from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ResolvedFrom {
        Query,
        Profile,
        Default,
    }

    /// Parse a query-string number. Surrounding whitespace is ignored;
    /// empty, non-numeric and non-finite values yield `None`.
    pub fn parse_query_number(raw: Option<&str>) -> Option<f64> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Both halves of a pair, when both are present and form a valid coordinate.
    pub fn pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinate> {
        let coordinate = Coordinate::new(latitude?, longitude?);
        coordinate.is_valid().then_some(coordinate)
    }

    /// Pick the request center: explicit query pair, else the profile's
    /// stored pair, else `default`. Pairs are taken whole; a query with
    /// only one usable half is ignored.
    pub fn resolve(
        query_lat: Option<&str>,
        query_lng: Option<&str>,
        profile: Option<Coordinate>,
        default: Coordinate,
    ) -> (Coordinate, ResolvedFrom) {
        let query = pair(parse_query_number(query_lat), parse_query_number(query_lng));
        if let Some(coordinate) = query {
            return (coordinate, ResolvedFrom::Query);
        }
        if query_lat.is_some() || query_lng.is_some() {
            log::warn!(
                "ignoring unusable query coordinate lat={:?} lng={:?}",
                query_lat,
                query_lng
            );
        }
        match profile.filter(|c| c.is_valid()) {
            Some(coordinate) => (coordinate, ResolvedFrom::Profile),
            None => (default, ResolvedFrom::Default),
        }
    }

}

/// Search radius helpers
pub mod radius {
    pub const DEFAULT_MAP_RADIUS_KM: f64 = 10.0;
    pub const MIN_MAP_RADIUS_KM: f64 = 1.0;
    pub const MAX_MAP_RADIUS_KM: f64 = 25.0;

    /// Radius of the current-reading query.
    pub const CURRENT_RADIUS_METERS: u32 = 15_000;

    /// Map radius in meters from a requested kilometer value, clamped to [1, 25] km.
    pub fn map_radius_meters(radius_km: Option<f64>) -> u32 {
        let km = radius_km
            .filter(|r| r.is_finite())
            .unwrap_or(DEFAULT_MAP_RADIUS_KM)
            .clamp(MIN_MAP_RADIUS_KM, MAX_MAP_RADIUS_KM);
        (km * 1000.0).round() as u32
    }

}

/// Time formatting helpers
pub mod time {
    use chrono::{DateTime, SecondsFormat, Utc};

    /// ISO 8601 with millisecond precision and a `Z` suffix.
    pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn now_timestamp() -> String {
        format_timestamp(&Utc::now())
    }

}
