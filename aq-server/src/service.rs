//! Live-or-sample fallback for the current reading and map endpoints.
//!
//! Every request tries the configured [`PollutantSource`] once, bounded by
//! a timeout. A failure, a timeout, or a live answer with nothing usable in
//! it switches that request to the bundled sample dataset. Nothing about
//! the outcome is remembered between requests.

use aq_core::location::{Bounds, LocationPoint};
use aq_core::measurement::{Coordinate, Measurement};
use aq_core::sample::{Alert, ForecastDay, SampleDataset, Weather};
use aq_core::source::{PollutantSource, UpstreamError};
use aq_data::aggregation::{aggregate_with, GroupingPolicy};
use aq_data::current::CurrentReading;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Provenance of a response, reported as its `dataSource` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Built from the live provider with this id.
    Live(&'static str),
    /// The provider failed; built from the sample.
    SampleFallback,
    /// The provider answered with nothing usable; built from the sample.
    SampleEmpty,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Live(id) => *id,
            DataSource::SampleFallback => "sample_fallback",
            DataSource::SampleEmpty => "sample_empty",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, DataSource::Live(_))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Why a request was served from the sample.
#[derive(Debug, PartialEq)]
pub enum FallbackReason {
    Upstream(UpstreamError),
    NoUsableData,
}

impl FallbackReason {
    pub fn data_source(&self) -> DataSource {
        match self {
            FallbackReason::Upstream(_) => DataSource::SampleFallback,
            FallbackReason::NoUsableData => DataSource::SampleEmpty,
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Upstream(e) => write!(f, "{}", e),
            FallbackReason::NoUsableData => f.write_str("no usable data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReport {
    pub reading: CurrentReading,
    pub weather: Weather,
    pub data_source: DataSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapReport {
    pub points: Vec<LocationPoint>,
    pub bounds: Bounds,
    pub data_source: DataSource,
}

pub struct AirQualityService {
    source: Arc<dyn PollutantSource>,
    sample: Arc<SampleDataset>,
    timeout: Duration,
    grouping: GroupingPolicy,
}

impl AirQualityService {
    pub fn new(
        source: Arc<dyn PollutantSource>,
        sample: Arc<SampleDataset>,
        timeout: Duration,
    ) -> Self {
        AirQualityService {
            source,
            sample,
            timeout,
            grouping: GroupingPolicy::default(),
        }
    }

    pub fn with_grouping(mut self, grouping: GroupingPolicy) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    pub fn sample(&self) -> &SampleDataset {
        &self.sample
    }

    async fn fetch_live(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Measurement>, UpstreamError> {
        let fetch = self.source.fetch_measurements(center, radius_meters);
        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    fn log_fallback(&self, endpoint: &str, center: Coordinate, reason: &FallbackReason) {
        log::warn!(
            "{} falling back to sample ({}): source={} reason={} center={}",
            endpoint,
            reason.data_source(),
            self.source.id(),
            reason,
            center
        );
    }

    /// Current reading around `center`.
    pub async fn current(&self, center: Coordinate, radius_meters: u32) -> CurrentReport {
        let outcome = match self.fetch_live(center, radius_meters).await {
            Ok(measurements) if measurements.is_empty() => Err(FallbackReason::NoUsableData),
            Ok(measurements) => Ok(measurements),
            Err(e) => Err(FallbackReason::Upstream(e)),
        };

        match outcome {
            Ok(measurements) => {
                log::info!(
                    "current: {} live measurements from {} around {}",
                    measurements.len(),
                    self.source.id(),
                    center
                );
                CurrentReport {
                    reading: CurrentReading::from_measurements(&measurements),
                    weather: Weather::placeholder(),
                    data_source: DataSource::Live(self.source.id()),
                }
            }
            Err(reason) => {
                self.log_fallback("current", center, &reason);
                CurrentReport {
                    reading: CurrentReading::from_sample(&self.sample),
                    weather: self
                        .sample
                        .current_data
                        .weather
                        .clone()
                        .unwrap_or_else(Weather::placeholder),
                    data_source: reason.data_source(),
                }
            }
        }
    }

    /// Aggregated map points around `center`.
    pub async fn map(&self, center: Coordinate, radius_meters: u32) -> MapReport {
        let outcome = match self.fetch_live(center, radius_meters).await {
            Ok(measurements) => {
                let points = aggregate_with(&measurements, self.grouping);
                match Bounds::enclosing(&points) {
                    Some(bounds) => Ok((points, bounds)),
                    None => Err(FallbackReason::NoUsableData),
                }
            }
            Err(e) => Err(FallbackReason::Upstream(e)),
        };

        match outcome {
            Ok((points, bounds)) => {
                log::info!(
                    "map: {} live points from {} around {}",
                    points.len(),
                    self.source.id(),
                    center
                );
                MapReport {
                    points,
                    bounds,
                    data_source: DataSource::Live(self.source.id()),
                }
            }
            Err(reason) => {
                self.log_fallback("map", center, &reason);
                MapReport {
                    points: self.sample.map_data.clone(),
                    bounds: self.sample.bounds().unwrap_or_else(|| Bounds::around(center)),
                    data_source: reason.data_source(),
                }
            }
        }
    }

    /// The static sample forecast.
    pub fn forecast(&self) -> &[ForecastDay] {
        &self.sample.forecast
    }

    /// Every sample alert, unfiltered.
    pub fn alerts(&self) -> &[Alert] {
        &self.sample.alerts
    }
}
