//! Workflow nodes backed by model providers.
//!
//! Each provider is packaged as a plugin. When added to the server it registers
//! its nodes with the [`NodeRegistry`](lumen_nodes::NodeRegistry).
//!
//! # Supported Providers
//!
//! | Provider | Feature Flag | Nodes |
//! |----------|--------------|-------|
//! | AWS Bedrock | `bedrock` (default) | `bedrockMultimodalInvoke` |
//!
//! # Usage
//!
//! Provider plugins depend on [`NodesPlugin`](lumen_nodes::NodesPlugin), which
//! provides the registry they register into.
//!
//! ```no_run
//! # #[cfg(feature = "bedrock")]
//! # {
//! use lumen_node_providers::BedrockPlugin;
//! use lumen_nodes::NodesPlugin;
//! use lumen_system::server::Server;
//!
//! let mut server = Server::new();
//! server.add_plugins(NodesPlugin);
//! server.add_plugins(BedrockPlugin::from_env());
//! server.finish();
//! # }
//! ```

#[cfg(feature = "bedrock")]
pub mod bedrock;

#[cfg(feature = "bedrock")]
pub use bedrock::BedrockPlugin;
