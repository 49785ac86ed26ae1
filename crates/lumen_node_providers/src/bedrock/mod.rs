//! AWS Bedrock nodes.
//!
//! [`MultimodalInvokeNode`] sends one image attachment and a prompt per item
//! to the Bedrock runtime `InvokeModel` endpoint
//! (`POST /model/{modelId}/invoke`) and returns each parsed response body.
//!
//! Transport goes through the [`ModelInvoker`] trait. [`BedrockInvoker`] is
//! the SigV4-signed implementation on top of `aws-sdk-bedrockruntime`; tests
//! and alternative transports plug in through
//! [`BedrockPlugin::with_invoker`].
//!
//! # Examples
//!
//! ```no_run
//! # use lumen_node_providers::bedrock::{AwsCredentials, BedrockPlugin};
//! # use lumen_system::server::Server;
//! # let mut server = Server::new();
//!
//! // Using default AWS credential chain
//! server.add_plugins(BedrockPlugin::from_env());
//!
//! // With static credentials
//! let credentials = AwsCredentials::new("AKIA...", "secret", "us-east-1");
//! server.add_plugins(BedrockPlugin::from_credentials(credentials));
//! ```

mod error;
mod invoker;
mod node;
mod plugin;
mod request;

pub use error::InvokeError;
pub use invoker::{BedrockInvoker, ModelInvoker};
pub use node::{MultimodalInvokeNode, NODE_NAME};
pub use plugin::{AwsCredentials, BedrockPlugin};
pub use request::{ANTHROPIC_VERSION, ContentBlock, ImageSource, InvokeRequest, Message, Role};
