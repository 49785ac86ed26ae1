//! Workflow nodes for Lumen.
//!
//! A workflow passes a sequence of [`Item`]s (a JSON payload plus named
//! binary attachments) through nodes. This crate defines:
//!
//! - [`Item`] and [`BinaryData`] - the data flowing between nodes
//! - [`NodeDescription`] - a node's parameter schema, defaults, and bounds
//! - [`NodeParameters`] - configured values, fixed or per-item expressions
//! - [`ExecutionContext`] - input items plus the continue-on-fail policy
//! - [`Node`] - the trait node implementations provide
//! - [`NodeRegistry`] and [`NodesPlugin`] - server-wide node lookup
//!
//! # Example
//!
//! ```
//! use lumen_nodes::{ExecutionContext, Item, NodeParameters, NodeRegistry, NodesPlugin};
//! use lumen_system::server::Server;
//! use serde_json::json;
//!
//! let mut server = Server::new();
//! server.add_plugins(NodesPlugin);
//! server.finish();
//!
//! let registry = server.get_global::<NodeRegistry>().unwrap();
//! assert!(registry.node_names().is_empty());
//!
//! let ctx = ExecutionContext::new(vec![Item::new(json!({"question": "What is this?"}))])
//!     .with_parameters(NodeParameters::new().with("prompt", "={{ $json.question }}"))
//!     .with_continue_on_fail(true);
//! assert_eq!(ctx.items().len(), 1);
//! ```

mod context;
mod description;
mod error;
mod expression;
mod item;
mod node;
mod parameters;
mod plugin;
mod registry;

pub use context::{ExecutionContext, ParameterResolver};
pub use description::{CredentialRequirement, NodeDescription, NodeProperty, PropertyKind, TypeOptions};
pub use error::{NodeError, RegistryError};
pub use expression::{ExpressionError, evaluate};
pub use item::{BinaryData, Item};
pub use node::Node;
pub use parameters::{NodeParameters, ParameterValue};
pub use plugin::NodesPlugin;
pub use registry::NodeRegistry;
