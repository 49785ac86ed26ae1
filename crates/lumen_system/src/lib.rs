//! Plugin host for Lumen.
//!
//! A [`server::Server`] owns [`plugin::Plugin`]s and the typed state they
//! publish ([`resource`]). Node registries and providers are built on top.
//!
//! ```
//! use lumen_system::plugin::Plugin;
//! use lumen_system::server::Server;
//! use lumen_system::resource::GlobalResource;
//!
//! #[derive(Default)]
//! struct Settings { max_items: usize }
//! impl GlobalResource for Settings {}
//!
//! struct SettingsPlugin;
//!
//! impl Plugin for SettingsPlugin {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(Settings::default());
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(SettingsPlugin);
//! server.finish();
//!
//! assert!(server.contains_global::<Settings>());
//! ```

pub mod plugin;
pub mod resource;
pub mod server;

/// Everything needed to write a plugin.
pub mod prelude {
    pub use crate::plugin::*;
    pub use crate::resource::*;
    pub use crate::server::*;
}
