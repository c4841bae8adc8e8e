use aq_core::measurement::Coordinate;
use aq_utils::coordinates::DEFAULT_COORDINATE;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_TOKEN_PREFIX: &str = "demo-token-";

/// Settings the router needs at request time.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    /// Center used when neither the query nor the profile names one.
    pub default_coordinate: Coordinate,
    /// Reported by the health endpoint.
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: DEFAULT_BIND.to_string(),
            default_coordinate: DEFAULT_COORDINATE,
            environment: "development".to_string(),
        }
    }
}
