//! Workflow nodes on a small plugin host.
//!
//! | Crate | Re-exported as |
//! |-------|----------------|
//! | `lumen_system` | [`system`] |
//! | `lumen_core_plugins` | [`core_plugins`] |
//! | `lumen_nodes` | [`nodes`] |
//! | `lumen_node_providers` | [`node_providers`] |
//!
//! ```no_run
//! use lumen::prelude::*;
//!
//! let mut server = Server::new();
//! server.add_plugins(DefaultPlugins.build());
//! server.add_plugins(NodesPlugin);
//! # #[cfg(feature = "bedrock")]
//! server.add_plugins(BedrockPlugin::from_env());
//! server.finish();
//! ```

pub use lumen_core_plugins as core_plugins;
pub use lumen_node_providers as node_providers;
pub use lumen_nodes as nodes;
pub use lumen_system as system;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use lumen_core_plugins::{DefaultPlugins, TracingFormat, TracingPlugin};
    #[cfg(feature = "bedrock")]
    pub use lumen_node_providers::BedrockPlugin;
    pub use lumen_nodes::{
        BinaryData, ExecutionContext, Item, Node, NodeDescription, NodeError, NodeParameters,
        NodeProperty, NodeRegistry, NodesPlugin,
    };
    pub use lumen_system::prelude::*;
}
