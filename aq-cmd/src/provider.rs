//! Provider selection shared by every subcommand.

use aq_core::sample::SampleDataset;
use aq_core::source::airnow::AirNowSource;
use aq_core::source::openaq::OpenAqSource;
use aq_core::source::{OfflineSource, PollutantSource};
use aq_data::aggregation::GroupingPolicy;
use aq_server::AirQualityService;
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Openaq,
    Airnow,
    /// No live provider; every request is served from the sample.
    Offline,
}

#[derive(Debug, Clone, Args)]
pub struct ProviderArgs {
    /// Live pollutant provider
    #[arg(long, value_enum, env = "AQ_PROVIDER", default_value = "openaq")]
    pub provider: ProviderKind,

    /// OpenAQ API key, sent as X-API-Key
    #[arg(long, env = "OPENAQ_API_KEY", hide_env_values = true)]
    pub openaq_api_key: Option<String>,

    /// AirNow API key, required for the airnow provider
    #[arg(long, env = "AIRNOW_API_KEY", hide_env_values = true)]
    pub airnow_api_key: Option<String>,

    /// Upper bound on one provider call, in seconds
    #[arg(long, env = "AQ_UPSTREAM_TIMEOUT_SECS", default_value_t = 8)]
    pub timeout_secs: u64,

    /// Sample dataset to fall back to instead of the bundled one
    #[arg(long, env = "AQ_SAMPLE_PATH")]
    pub sample_path: Option<String>,

    /// Group map readings by provider site id before coordinate
    #[arg(long)]
    pub group_by_site: bool,
}

impl ProviderArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn build_source(&self) -> anyhow::Result<Arc<dyn PollutantSource>> {
        let client = || {
            reqwest::Client::builder()
                .timeout(self.timeout())
                .build()
                .context("failed to build HTTP client")
        };
        let source: Arc<dyn PollutantSource> = match self.provider {
            ProviderKind::Openaq => {
                Arc::new(OpenAqSource::new(client()?, self.openaq_api_key.clone()))
            }
            ProviderKind::Airnow => {
                let key = self
                    .airnow_api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .context("the airnow provider needs --airnow-api-key or AIRNOW_API_KEY")?;
                Arc::new(AirNowSource::new(client()?, key))
            }
            ProviderKind::Offline => Arc::new(OfflineSource),
        };
        Ok(source)
    }

    pub fn load_sample(&self) -> anyhow::Result<SampleDataset> {
        match &self.sample_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read sample dataset {}", path))?;
                SampleDataset::parse(&json)
                    .with_context(|| format!("invalid sample dataset {}", path))
            }
            None => Ok(SampleDataset::bundled().clone()),
        }
    }

    pub fn build_service(&self) -> anyhow::Result<AirQualityService> {
        let source = self.build_source()?;
        let sample = self.load_sample()?;
        log::info!(
            "provider={} timeout={:?} sample={}",
            source.id(),
            self.timeout(),
            sample.version
        );
        let grouping = if self.group_by_site {
            GroupingPolicy::SiteThenCoordinate
        } else {
            GroupingPolicy::Coordinate
        };
        Ok(AirQualityService::new(source, Arc::new(sample), self.timeout()).with_grouping(grouping))
    }
}
