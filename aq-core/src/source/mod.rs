//! Pollutant data sources.
//!
//! Every upstream provider is one implementation of [`PollutantSource`]:
//! given a coordinate and a radius it returns normalized [`Measurement`]s,
//! newest first, or an [`UpstreamError`]. Callers never pass provider
//! errors through to their clients; they fall back to sample data instead.

use crate::measurement::{Coordinate, Measurement};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "api")]
pub mod airnow;
#[cfg(feature = "api")]
pub mod openaq;

/// Ways a live source can fail to produce measurements.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpstreamError {
    /// Non-2xx HTTP response from the provider.
    #[error("provider returned HTTP {status_code}: {body}")]
    Status { status_code: u16, body: String },
    /// Connection, TLS or body transfer failure.
    #[error("request to provider failed: {0}")]
    Network(String),
    /// The response body did not have a shape we understand.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    /// No response within the configured bound.
    #[error("provider did not respond within {0:?}")]
    Timeout(Duration),
    /// No live provider is configured.
    #[error("live source disabled")]
    Disabled,
}

/// A provider of raw pollutant measurements.
#[async_trait]
pub trait PollutantSource: Send + Sync {
    /// Identifier reported as the response `dataSource` when live data is used.
    fn id(&self) -> &'static str;

    /// Fetch recent measurements within `radius_meters` of `center`,
    /// ordered newest first.
    async fn fetch_measurements(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Measurement>, UpstreamError>;
}

/// The source used when no provider is configured: always fails with
/// [`UpstreamError::Disabled`], so every request is served from the sample.
pub struct OfflineSource;

#[async_trait]
impl PollutantSource for OfflineSource {
    fn id(&self) -> &'static str {
        "offline"
    }

    async fn fetch_measurements(
        &self,
        _center: Coordinate,
        _radius_meters: u32,
    ) -> Result<Vec<Measurement>, UpstreamError> {
        Err(UpstreamError::Disabled)
    }
}

/// Clamp a requested radius into the range a provider accepts.
pub fn clamp_radius(radius_meters: u32, min_meters: u32, max_meters: u32) -> u32 {
    radius_meters.clamp(min_meters, max_meters)
}
