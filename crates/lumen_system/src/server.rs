//! The plugin host.
//!
//! A [`Server`] collects plugins, wires them in dependency order, and keeps
//! two resource sets:
//!
//! - **build-time resources**, mutable while plugins build (provider plugins
//!   use them to register nodes into a shared registry)
//! - **globals**, read-only, shared by every node run once the server is built
//!
//! # Lifecycle
//!
//! [`Server::finish`] orders the queued plugins so each one follows its
//! dependencies, then calls `build()` on all of them and `ready()` on all of
//! them, in that order. [`Server::cleanup`] calls `cleanup()` last-to-first.

use crate::plugin::{Plugin, PluginId, Plugins};
use crate::resource::{GlobalResource, Resource, ResourceRef, ResourceRefMut, Resources};
use hashbrown::{HashMap, HashSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Collecting,
    Building,
    Finished,
}

/// Hosts plugins and the resources they publish.
///
/// ```
/// use lumen_system::plugin::Plugin;
/// use lumen_system::server::Server;
///
/// struct Greeting;
///
/// impl Plugin for Greeting {
///     fn build(&self, server: &mut Server) {
///         server.insert_resource(String::from("hello"));
///     }
/// }
///
/// let mut server = Server::new();
/// server.add_plugins(Greeting);
/// server.finish();
///
/// assert!(server.is_built());
/// assert_eq!(*server.get_resource::<String>().unwrap(), "hello");
/// ```
#[derive(Default)]
pub struct Server {
    globals: Resources,
    resources: Resources,
    queued: Vec<Slot>,
    /// Built plugins, in the order `build()` ran.
    active: Vec<Slot>,
    seen: HashSet<PluginId>,
    phase: Phase,
}

struct Slot {
    id: PluginId,
    plugin: Box<dyn Plugin>,
}

impl Slot {
    fn name(&self) -> &str {
        self.plugin.name()
    }
}

impl Server {
    /// Creates a server with no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugins
    // ─────────────────────────────────────────────────────────────────────────

    /// Queues a plugin, or every plugin of a
    /// [`PluginGroupBuilder`](crate::plugin::PluginGroupBuilder).
    ///
    /// Plugins added from inside another plugin's `build()` are built on the
    /// spot.
    ///
    /// # Panics
    ///
    /// If a plugin whose [`is_unique`](Plugin::is_unique) is `true` is added a
    /// second time.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_server(self);
        self
    }

    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn Plugin>) {
        let first_time = self.seen.insert(id);
        assert!(
            first_time || !plugin.is_unique(),
            "plugin '{}' was added twice; override `is_unique` to allow several instances",
            plugin.name()
        );

        let slot = Slot { id, plugin };
        if self.phase == Phase::Building {
            slot.plugin.build(self);
            self.active.push(slot);
        } else {
            self.queued.push(slot);
        }
    }

    /// Returns true once a plugin of type `P` has been added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.seen.contains(&PluginId::of::<P>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Build-time resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Stores a build-time resource, returning the one it replaces.
    pub fn insert_resource<R: Resource>(&mut self, resource: R) -> Option<R> {
        self.resources.insert(resource)
    }

    /// Returns true if a build-time `R` is stored.
    #[must_use]
    pub fn contains_resource<R: Resource>(&self) -> bool {
        self.resources.contains::<R>()
    }

    /// Reads a build-time resource. `None` if absent or being written.
    #[must_use]
    pub fn get_resource<R: Resource>(&self) -> Option<ResourceRef<'_, R>> {
        self.resources.get::<R>().ok()
    }

    /// Writes a build-time resource. `None` if absent or already borrowed.
    #[must_use]
    pub fn get_resource_mut<R: Resource>(&self) -> Option<ResourceRefMut<'_, R>> {
        self.resources.get_mut::<R>().ok()
    }

    /// Takes a build-time resource out of the server.
    pub fn remove_resource<R: Resource>(&mut self) -> Option<R> {
        self.resources.remove::<R>()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Globals
    // ─────────────────────────────────────────────────────────────────────────

    /// Publishes a read-only global, returning the one it replaces.
    pub fn insert_global<R: GlobalResource>(&mut self, resource: R) -> Option<R> {
        self.globals.insert(resource)
    }

    /// Returns true if a global `R` is published.
    #[must_use]
    pub fn contains_global<R: GlobalResource>(&self) -> bool {
        self.globals.contains::<R>()
    }

    /// Reads a global.
    #[must_use]
    pub fn get_global<R: GlobalResource>(&self) -> Option<ResourceRef<'_, R>> {
        self.globals.get::<R>().ok()
    }

    /// Returns true after [`finish`](Self::finish) has returned.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.phase == Phase::Finished
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Orders, builds, and readies every queued plugin.
    ///
    /// # Panics
    ///
    /// On a second call, when a declared dependency was never added, or when
    /// dependencies form a cycle. All three are wiring mistakes.
    pub fn finish(&mut self) {
        assert!(
            self.phase == Phase::Collecting,
            "Server::finish() may only be called once"
        );

        let ordered = self.dependency_order();

        self.phase = Phase::Building;
        for slot in ordered {
            slot.plugin.build(self);
            self.active.push(slot);
        }

        // `ready` needs `&mut self`, so run it over a detached list.
        let active = core::mem::take(&mut self.active);
        for slot in &active {
            slot.plugin.ready(self);
        }
        let added_during_ready = core::mem::replace(&mut self.active, active);
        self.active.extend(added_during_ready);

        self.phase = Phase::Finished;
    }

    /// Calls `cleanup()` on every built plugin, last built first.
    pub fn cleanup(&mut self) {
        let active = core::mem::take(&mut self.active);
        for slot in active.iter().rev() {
            slot.plugin.cleanup(self);
        }
        self.active = active;
    }

    /// Drains the queue in an order where every plugin follows its
    /// dependencies (Kahn's algorithm). Ties keep insertion order.
    fn dependency_order(&mut self) -> Vec<Slot> {
        let queued = core::mem::take(&mut self.queued);
        let position: HashMap<PluginId, usize> = queued
            .iter()
            .enumerate()
            .map(|(index, slot)| (slot.id, index))
            .collect();

        let mut waiting_on = vec![0usize; queued.len()];
        let mut unlocks: Vec<Vec<usize>> = vec![Vec::new(); queued.len()];

        for (index, slot) in queued.iter().enumerate() {
            for dependency in slot.plugin.dependencies() {
                if let Some(&provider) = position.get(&dependency) {
                    unlocks[provider].push(index);
                    waiting_on[index] += 1;
                } else if !self.active.iter().any(|built| built.id == dependency) {
                    panic!(
                        "plugin '{}' depends on '{}', which was not added to the server",
                        slot.name(),
                        dependency.type_name()
                    );
                }
            }
        }

        let mut ready: VecDeque<usize> = (0..queued.len())
            .filter(|&index| waiting_on[index] == 0)
            .collect();
        let mut order = Vec::with_capacity(queued.len());

        while let Some(index) = ready.pop_front() {
            order.push(index);
            for &next in &unlocks[index] {
                waiting_on[next] -= 1;
                if waiting_on[next] == 0 {
                    ready.push_back(next);
                }
            }
        }

        if order.len() < queued.len() {
            let stuck: Vec<&str> = (0..queued.len())
                .filter(|&index| waiting_on[index] > 0)
                .map(|index| queued[index].name())
                .collect();
            panic!("Circular dependency between plugins: {stuck:?}");
        }

        let mut slots: Vec<Option<Slot>> = queued.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }
}
