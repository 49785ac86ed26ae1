//! Plugins every Lumen host wants: host metadata and log output.
//!
//! [`DefaultPlugins`] bundles [`ServerInfoPlugin`] and [`TracingPlugin`].
//! Add them individually to configure logging up front:
//!
//! ```
//! use lumen_system::server::Server;
//! use lumen_core_plugins::{ServerInfoPlugin, TracingPlugin};
//! use tracing::Level;
//!
//! let mut server = Server::new();
//! server
//!     .add_plugins(ServerInfoPlugin)
//!     .add_plugins(TracingPlugin::default().with_level(Level::DEBUG));
//! server.finish();
//! ```

mod server_info;
mod tracing_plugin;

pub use server_info::{ServerInfo, ServerInfoPlugin};
pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};

use lumen_system::plugin::{PluginGroup, PluginGroupBuilder};

/// [`ServerInfoPlugin`] plus a default [`TracingPlugin`].
///
/// To log differently, disable the bundled tracing plugin and add your own:
///
/// ```
/// use lumen_system::plugin::PluginGroup;
/// use lumen_system::server::Server;
/// use lumen_core_plugins::{DefaultPlugins, TracingFormat, TracingPlugin};
///
/// let mut server = Server::new();
/// server.add_plugins(
///     DefaultPlugins
///         .build()
///         .disable::<TracingPlugin>()
///         .add(TracingPlugin::new().with_format(TracingFormat::Json)),
/// );
/// server.finish();
/// ```
pub struct DefaultPlugins;

impl PluginGroup for DefaultPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(ServerInfoPlugin)
            .add(TracingPlugin::default())
    }
}
