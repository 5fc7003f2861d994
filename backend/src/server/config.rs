//! HTTP server configuration object.

use std::net::SocketAddr;

use cs_assistant::settings::AppSettings;

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) settings: AppSettings,
}

impl ServerConfig {
    /// Server bound to `bind_addr`, wiring adapters from `settings`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, settings: AppSettings) -> Self {
        Self {
            bind_addr,
            settings,
        }
    }
}
