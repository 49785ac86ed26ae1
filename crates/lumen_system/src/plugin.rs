//! Plugins: the unit of composition for a Lumen host.
//!
//! Logging, the node registry, and each node provider are plugins. A plugin
//! names the plugins it needs through [`Plugin::dependencies`], and the
//! [`Server`] builds them in an order that satisfies those edges.
//!
//! ```
//! use lumen_system::plugin::{Plugin, PluginId};
//! use lumen_system::server::Server;
//!
//! #[derive(Default)]
//! struct Catalog(Vec<&'static str>);
//!
//! struct CatalogPlugin;
//! impl Plugin for CatalogPlugin {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_resource(Catalog::default());
//!     }
//! }
//!
//! struct VisionPlugin;
//! impl Plugin for VisionPlugin {
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<CatalogPlugin>()]
//!     }
//!
//!     fn build(&self, server: &mut Server) {
//!         if let Some(mut catalog) = server.get_resource_mut::<Catalog>() {
//!             catalog.0.push("describe-image");
//!         }
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(VisionPlugin).add_plugins(CatalogPlugin);
//! server.finish();
//! assert_eq!(server.get_resource::<Catalog>().unwrap().0, ["describe-image"]);
//! ```

use core::any::TypeId;

use crate::server::Server;

/// The type of a plugin, as used in dependency lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Identifies plugin type `P`.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type path of the plugin, for panic messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Extends a [`Server`] with resources and behaviour.
///
/// [`Server::finish`] calls `build()` on every plugin, dependencies first,
/// then `ready()` on every plugin in the same order. [`Server::cleanup`]
/// calls `cleanup()` last-built first.
///
/// Registries follow a two-step pattern: insert a resource in `build()` so
/// dependants can fill it during their own `build()`, then move it into the
/// globals in `ready()`.
pub trait Plugin: Send + Sync + 'static {
    /// Inserts resources and globals.
    fn build(&self, server: &mut Server);

    /// Called after all plugins are built.
    fn ready(&self, _server: &mut Server) {}

    /// Called on shutdown.
    fn cleanup(&self, _server: &mut Server) {}

    /// Name shown in panics. Defaults to the type path.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Plugins whose `build()` must run before this one's.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Return `false` to allow the same plugin type to be added more than once.
    fn is_unique(&self) -> bool {
        true
    }
}

/// Anything [`Server::add_plugins`] accepts.
pub trait Plugins {
    /// Hands the plugin(s) to `server`.
    fn add_to_server(self, server: &mut Server);
}

impl<P: Plugin> Plugins for P {
    fn add_to_server(self, server: &mut Server) {
        server.add_plugin_boxed(PluginId::of::<P>(), Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_server(self, server: &mut Server) {
        self.entries
            .into_iter()
            .for_each(|(id, plugin)| server.add_plugin_boxed(id, plugin));
    }
}

/// A preset list of plugins, such as the defaults for a host.
///
/// ```
/// use lumen_system::plugin::{Plugin, PluginGroup, PluginGroupBuilder};
/// use lumen_system::server::Server;
///
/// struct Logs;
/// impl Plugin for Logs { fn build(&self, _: &mut Server) {} }
/// struct Metrics;
/// impl Plugin for Metrics { fn build(&self, _: &mut Server) {} }
///
/// struct Host;
/// impl PluginGroup for Host {
///     fn build(self) -> PluginGroupBuilder {
///         PluginGroupBuilder::new().add(Logs).add(Metrics)
///     }
/// }
///
/// let plugins = Host.build().disable::<Metrics>();
/// assert_eq!(plugins.len(), 1);
/// Server::new().add_plugins(plugins).finish();
/// ```
pub trait PluginGroup {
    /// Produces the editable list.
    fn build(self) -> PluginGroupBuilder;
}

/// Plugins in insertion order, editable before they reach a server.
#[derive(Default)]
pub struct PluginGroupBuilder {
    entries: Vec<(PluginId, Box<dyn Plugin>)>,
}

impl PluginGroupBuilder {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `plugin`.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "builder method, unrelated to std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.entries.push((PluginId::of::<P>(), Box::new(plugin)));
        self
    }

    /// Drops every plugin of type `P`.
    #[must_use]
    pub fn disable<P: Plugin>(mut self) -> Self {
        let id = PluginId::of::<P>();
        self.entries.retain(|(entry, _)| *entry != id);
        self
    }

    /// Number of plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a plugin of type `P` is in the list.
    #[must_use]
    pub fn contains<P: Plugin>(&self) -> bool {
        let id = PluginId::of::<P>();
        self.entries.iter().any(|(entry, _)| *entry == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Registry;
    impl Plugin for Registry {
        fn build(&self, _server: &mut Server) {}
    }

    struct Provider;
    impl Plugin for Provider {
        fn build(&self, _server: &mut Server) {}
        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<Registry>()]
        }
    }

    #[test]
    fn ids_compare_by_type() {
        let registry = PluginId::of::<Registry>();
        assert_eq!(registry, PluginId::of::<Registry>());
        assert_ne!(registry, PluginId::of::<Provider>());
        assert_eq!(registry.type_id(), TypeId::of::<Registry>());
        assert!(registry.type_name().ends_with("Registry"));
    }

    #[test]
    fn trait_defaults() {
        assert!(Registry.name().ends_with("Registry"));
        assert!(Registry.is_unique());
        assert!(Registry.dependencies().is_empty());
        assert_eq!(Provider.dependencies(), [PluginId::of::<Registry>()]);
    }

    #[test]
    fn builder_add_and_disable() {
        let group = PluginGroupBuilder::new().add(Registry).add(Provider);
        assert_eq!(group.len(), 2);

        let group = group.disable::<Registry>();
        assert!(!group.contains::<Registry>());
        assert!(group.contains::<Provider>());

        let group = group.disable::<Provider>().disable::<Provider>();
        assert!(group.is_empty());
    }
}
