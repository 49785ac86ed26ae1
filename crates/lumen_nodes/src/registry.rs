//! Registry of available nodes.

use crate::context::ExecutionContext;
use crate::description::NodeDescription;
use crate::error::RegistryError;
use crate::item::Item;
use crate::node::Node;
use lumen_system::resource::GlobalResource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;

/// Registry of node implementations, keyed by [`NodeDescription::name`].
///
/// # For Hosts
///
/// After [`Server::finish`](lumen_system::server::Server::finish) the registry
/// is an immutable global. Look nodes up by name and run them with
/// [`execute`](Self::execute).
///
/// # For Node Plugin Authors
///
/// Node plugins register during their `build()` phase, while the registry is a
/// mutable resource:
///
/// ```
/// # use async_trait::async_trait;
/// # use lumen_nodes::{ExecutionContext, Item, Node, NodeDescription, NodeError};
/// use lumen_nodes::{NodeRegistry, NodesPlugin};
/// use lumen_system::plugin::{Plugin, PluginId};
/// use lumen_system::server::Server;
/// use std::sync::Arc;
///
/// # struct Passthrough;
/// # #[async_trait]
/// # impl Node for Passthrough {
/// #     fn description(&self) -> NodeDescription { NodeDescription::new("passthrough", "Passthrough") }
/// #     async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Item>, NodeError> {
/// #         Ok(ctx.items().to_vec())
/// #     }
/// # }
/// struct PassthroughPlugin;
///
/// impl Plugin for PassthroughPlugin {
///     fn dependencies(&self) -> Vec<PluginId> {
///         vec![PluginId::of::<NodesPlugin>()]
///     }
///
///     fn build(&self, server: &mut Server) {
///         let mut registry = server
///             .get_resource_mut::<NodeRegistry>()
///             .expect("NodesPlugin must be added before node plugins");
///
///         registry.register_node(Arc::new(Passthrough));
///     }
/// }
///
/// let mut server = Server::new();
/// server.add_plugins(NodesPlugin).add_plugins(PassthroughPlugin);
/// server.finish();
///
/// let registry = server.get_global::<NodeRegistry>().unwrap();
/// assert!(registry.has_node("passthrough"));
/// ```
#[derive(Default, Clone)]
pub struct NodeRegistry {
    nodes: HashMap<String, Arc<dyn Node>>,
}

impl core::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("nodes", &self.node_names())
            .finish()
    }
}

impl GlobalResource for NodeRegistry {}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node under its description name.
    ///
    /// # Panics
    ///
    /// Panics if a node with the same name is already registered.
    pub fn register_node<N: Node>(&mut self, node: Arc<N>) {
        let name = node.description().name;
        assert!(
            !self.nodes.contains_key(&name),
            "node '{name}' is already registered"
        );
        tracing::debug!(node = %name, "registered node");
        self.nodes.insert(name, node as Arc<dyn Node>);
    }

    /// Returns a node by name.
    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<Arc<dyn Node>> {
        self.nodes.get(name.as_ref()).cloned()
    }

    /// Checks if a node is registered.
    #[must_use]
    pub fn has_node(&self, name: impl AsRef<str>) -> bool {
        self.nodes.contains_key(name.as_ref())
    }

    /// Lists registered node names, sorted.
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the descriptions of all registered nodes, sorted by name.
    #[must_use]
    pub fn descriptions(&self) -> Vec<NodeDescription> {
        let mut descriptions: Vec<_> = self.nodes.values().map(|n| n.description()).collect();
        descriptions.sort_by(|a, b| a.name.cmp(&b.name));
        descriptions
    }

    /// Runs the named node over `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownNode`] if no node has that name, or
    /// [`RegistryError::Execution`] if the node fails.
    pub async fn execute(
        &self,
        name: &str,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Item>, RegistryError> {
        let node = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownNode(name.to_string()))?;

        let span = tracing::info_span!("node", node = %name, items = ctx.items().len());
        async {
            tracing::info!(continue_on_fail = ctx.continue_on_fail(), "executing node");
            let output = node.execute(ctx).await?;
            tracing::info!(outputs = output.len(), "node finished");
            Ok::<_, RegistryError>(output)
        }
        .instrument(span)
        .await
    }
}
