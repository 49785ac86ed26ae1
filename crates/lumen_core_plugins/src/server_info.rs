//! Host metadata.

use lumen_system::plugin::Plugin;
use lumen_system::resource::GlobalResource;
use lumen_system::server::Server;

/// Facts about the running host, published as a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Crate version of the host.
    pub version: &'static str,
    /// Whether debug assertions are compiled in.
    pub debug: bool,
}

impl GlobalResource for ServerInfo {}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            debug: cfg!(debug_assertions),
        }
    }
}

impl ServerInfo {
    /// `lumen/<version>`, suitable for user-agent style tags.
    #[must_use]
    pub fn product(&self) -> String {
        format!("lumen/{}", self.version)
    }
}

/// Publishes [`ServerInfo`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerInfoPlugin;

impl Plugin for ServerInfoPlugin {
    fn build(&self, server: &mut Server) {
        server.insert_global(ServerInfo::default());
    }
}
