//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use websoul_settings::RelaySettings;

/// Configuration for the inquiry relay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Directory served for every path without a route.
    pub site_root: PathBuf,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            site_root: PathBuf::from("."),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl From<&RelaySettings> for ServerConfig {
    fn from(relay: &RelaySettings) -> Self {
        Self {
            host: relay.host.clone(),
            port: relay.port,
            site_root: PathBuf::from(&relay.site_root),
            max_body_bytes: relay.max_body_bytes,
        }
    }
}
