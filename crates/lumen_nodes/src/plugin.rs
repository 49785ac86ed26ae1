//! Provides the [`NodeRegistry`] global resource.

use crate::registry::NodeRegistry;
use lumen_system::plugin::Plugin;
use lumen_system::server::Server;

/// Plugin that provides the [`NodeRegistry`].
///
/// # Lifecycle
///
/// 1. **`build()` phase**: The registry is inserted as a mutable resource.
///    Node plugins (e.g. `BedrockPlugin`) call
///    [`NodeRegistry::register_node`] on it.
///
/// 2. **`ready()` phase**: The registry is moved to an immutable global.
///
/// Node plugins must declare a dependency on `NodesPlugin` so they build
/// after it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodesPlugin;

impl Plugin for NodesPlugin {
    fn build(&self, server: &mut Server) {
        server.insert_resource(NodeRegistry::new());
    }

    fn ready(&self, server: &mut Server) {
        let registry = server.remove_resource::<NodeRegistry>().unwrap_or_default();
        tracing::debug!(nodes = ?registry.node_names(), "node registry sealed");
        server.insert_global(registry);
    }
}
