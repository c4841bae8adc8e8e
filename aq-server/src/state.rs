use crate::auth::IdentityService;
use crate::config::ServerConfig;
use crate::service::AirQualityService;
use aq_db::ProfileStore;
use std::sync::Arc;

/// Shared, read-only handles every handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AirQualityService>,
    pub profiles: Arc<dyn ProfileStore>,
    pub identity: Arc<dyn IdentityService>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        service: AirQualityService,
        profiles: Arc<dyn ProfileStore>,
        identity: Arc<dyn IdentityService>,
        config: ServerConfig,
    ) -> Self {
        AppState {
            service: Arc::new(service),
            profiles,
            identity,
            config: Arc::new(config),
        }
    }
}
