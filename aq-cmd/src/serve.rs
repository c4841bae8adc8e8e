//! `serve` subcommand: wire the service, profile store and identity into
//! the HTTP API.

use aq_db::{Database, MemoryProfileStore, ProfileStore};
use aq_server::config::{DEFAULT_BIND, DEFAULT_TOKEN_PREFIX};
use aq_server::{AppState, PrefixTokenIdentity, ServerConfig};
use aq_utils::coordinates::{pair, DEFAULT_COORDINATE};
use clap::Args;
use log::info;
use std::sync::Arc;

use crate::provider::ProviderArgs;

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "AQ_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// SQLite profile database; profiles live in memory when absent
    #[arg(long, env = "AQ_DB_PATH")]
    pub db_path: Option<String>,

    /// Bearer tokens are `<prefix><user id>`
    #[arg(long, env = "AQ_TOKEN_PREFIX", default_value = DEFAULT_TOKEN_PREFIX)]
    pub token_prefix: String,

    /// Latitude used when neither the request nor the profile has one
    #[arg(long, allow_hyphen_values = true)]
    pub default_lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub default_lng: Option<f64>,

    /// Environment name reported by /api/health
    #[arg(long, env = "AQ_ENV", default_value = "development")]
    pub environment: String,
}

impl ServeArgs {
    pub fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let default_coordinate = match (self.default_lat, self.default_lng) {
            (None, None) => DEFAULT_COORDINATE,
            (lat, lng) => pair(lat, lng).ok_or_else(|| {
                anyhow::anyhow!("--default-lat and --default-lng must both be given and in range")
            })?,
        };
        Ok(ServerConfig {
            bind: self.bind.clone(),
            default_coordinate,
            environment: self.environment.clone(),
        })
    }

    pub fn profile_store(&self) -> anyhow::Result<Arc<dyn ProfileStore>> {
        match &self.db_path {
            Some(path) => Ok(Arc::new(Database::open(path)?)),
            None => {
                info!("No profile database configured, keeping profiles in memory");
                Ok(Arc::new(MemoryProfileStore::new()))
            }
        }
    }
}

pub async fn run_serve(provider: &ProviderArgs, server: &ServeArgs) -> anyhow::Result<()> {
    let config = server.server_config()?;
    let service = provider.build_service()?;
    let profiles = server.profile_store()?;
    let identity = Arc::new(PrefixTokenIdentity::new(server.token_prefix.clone()));

    aq_server::serve(AppState::new(service, profiles, identity, config)).await
}
