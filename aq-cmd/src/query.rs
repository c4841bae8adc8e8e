//! One-shot `current` and `map` queries.

use aq_core::location::LocationPoint;
use aq_core::measurement::Coordinate;
use aq_server::http::air_quality::{CurrentResponse, MapResponse, ResolvedLocation};
use aq_server::DataSource;
use aq_utils::coordinates::{pair, ResolvedFrom, DEFAULT_COORDINATE};
use aq_utils::radius::{map_radius_meters, CURRENT_RADIUS_METERS};
use log::info;
use std::path::Path;

use crate::provider::ProviderArgs;

fn resolve_center(lat: Option<f64>, lng: Option<f64>) -> (Coordinate, ResolvedFrom) {
    match pair(lat, lng) {
        Some(coordinate) => (coordinate, ResolvedFrom::Query),
        None => {
            if lat.is_some() || lng.is_some() {
                log::warn!("ignoring incomplete or out-of-range coordinate, using default");
            }
            (DEFAULT_COORDINATE, ResolvedFrom::Default)
        }
    }
}

fn report_source(endpoint: &str, data_source: DataSource) {
    if data_source.is_live() {
        info!("{} served live from {}", endpoint, data_source);
    } else {
        log::warn!("{} served from sample ({})", endpoint, data_source);
    }
}

/// Print the current reading around a location.
pub async fn run_current(
    provider: &ProviderArgs,
    lat: Option<f64>,
    lng: Option<f64>,
) -> anyhow::Result<()> {
    let service = provider.build_service()?;
    let (center, resolved_from) = resolve_center(lat, lng);

    let report = service.current(center, CURRENT_RADIUS_METERS).await;
    report_source("current", report.data_source);

    let location = ResolvedLocation {
        latitude: center.latitude,
        longitude: center.longitude,
        resolved_from,
    };
    let response = CurrentResponse::new(report, location, None);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Print map points around a location, or write them to `output_csv`.
pub async fn run_map(
    provider: &ProviderArgs,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
    output_csv: Option<&str>,
) -> anyhow::Result<()> {
    let service = provider.build_service()?;
    let (center, _) = resolve_center(lat, lng);
    let radius = map_radius_meters(radius_km);

    info!("Querying map points within {} m of {}", radius, center);
    let report = service.map(center, radius).await;
    report_source("map", report.data_source);

    match output_csv {
        Some(path) => {
            write_points_csv(Path::new(path), &report.points)?;
            info!("Wrote {} points to {}", report.points.len(), path);
        }
        None => {
            let response = MapResponse::from(report);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write map points as `latitude,longitude,aqi,category,color,pm25,pm10`.
/// Missing concentrations are written as empty fields.
pub fn write_points_csv(path: &Path, points: &[LocationPoint]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["latitude", "longitude", "aqi", "category", "color", "pm25", "pm10"])?;
    for point in points {
        writer.write_record([
            point.latitude.to_string(),
            point.longitude.to_string(),
            point.aqi.to_string(),
            point.category.label().to_string(),
            point.color.clone(),
            optional(point.pm25),
            optional(point.pm10),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
