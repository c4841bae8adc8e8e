//! Command implementations for the AQ CLI.
//!
//! `serve` runs the HTTP API; `current` and `map` run one request through
//! the same live-or-sample service and print the result.

use clap::Subcommand;

pub mod provider;
pub mod query;
pub mod serve;

pub use provider::{ProviderArgs, ProviderKind};
pub use serve::ServeArgs;

#[derive(Subcommand)]
pub enum Command {
    /// Run the air quality HTTP API
    Serve {
        #[command(flatten)]
        provider: ProviderArgs,

        #[command(flatten)]
        server: ServeArgs,
    },

    /// Print the current reading around a location as JSON
    Current {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Latitude of the center (defaults to New York City)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the center
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Print aggregated map points around a location, or write them as CSV
    Map {
        #[command(flatten)]
        provider: ProviderArgs,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Search radius in kilometers, clamped to 1..=25
        #[arg(long)]
        radius_km: Option<f64>,

        /// Write the points to this CSV instead of printing JSON
        #[arg(short = 'o', long)]
        output_csv: Option<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve { provider, server } => serve::run_serve(&provider, &server).await,
        Command::Current { provider, lat, lng } => query::run_current(&provider, lat, lng).await,
        Command::Map {
            provider,
            lat,
            lng,
            radius_km,
            output_csv,
        } => query::run_map(&provider, lat, lng, radius_km, output_csv.as_deref()).await,
    }
}
