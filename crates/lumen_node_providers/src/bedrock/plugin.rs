//! Wiring the Bedrock node into a server.

use super::invoker::{BedrockInvoker, ModelInvoker};
use super::node::MultimodalInvokeNode;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::{BehaviorVersion, Credentials, Region};
use lumen_nodes::{NodeRegistry, NodesPlugin};
use lumen_system::plugin::{Plugin, PluginId};
use lumen_system::server::Server;
use serde::Deserialize;
use std::sync::Arc;

/// Static AWS credentials for [`BedrockPlugin::from_credentials`].
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,
    /// Region hosting the Bedrock runtime, e.g. `us-east-1`.
    pub region: String,
    /// Custom runtime endpoint, e.g. a VPC endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl AwsCredentials {
    /// Creates long-term credentials for `region`.
    #[must_use]
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            region: region.into(),
            endpoint: None,
        }
    }

    /// Sets a session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Overrides the runtime endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn client(&self) -> Client {
        let credentials = Credentials::new(
            &self.access_key_id,
            &self.secret_access_key,
            self.session_token.clone(),
            None,
            "lumen",
        );

        let mut config = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &self.endpoint {
            config = config.endpoint_url(endpoint);
        }

        Client::from_conf(config.build())
    }
}

impl core::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

enum ClientSource {
    Env,
    SdkConfig(aws_config::SdkConfig),
    Credentials(AwsCredentials),
    Invoker(Arc<dyn ModelInvoker>),
}

/// Registers the Bedrock multimodal invoke node with the [`NodeRegistry`].
///
/// The client is created when the plugin builds, from one of four sources:
/// the ambient AWS credential chain, a loaded `SdkConfig`, static
/// [`AwsCredentials`], or a caller-supplied [`ModelInvoker`].
///
/// ```no_run
/// use lumen_node_providers::bedrock::{AwsCredentials, BedrockPlugin};
/// use lumen_nodes::NodesPlugin;
/// use lumen_system::server::Server;
///
/// let mut server = Server::new();
/// server.add_plugins(NodesPlugin).add_plugins(BedrockPlugin::from_credentials(
///     AwsCredentials::new("AKIA...", "secret", "eu-central-1"),
/// ));
/// server.finish();
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
///     .region("us-west-2")
///     .load()
///     .await;
/// let _plugin = BedrockPlugin::from_sdk_config(shared);
/// # });
/// ```
pub struct BedrockPlugin {
    source: ClientSource,
}

impl BedrockPlugin {
    /// Resolves credentials and region from the environment, profile files, or
    /// instance metadata, like the AWS CLI does.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            source: ClientSource::Env,
        }
    }

    /// Reuses an `SdkConfig` the host has already loaded.
    #[must_use]
    pub fn from_sdk_config(sdk_config: aws_config::SdkConfig) -> Self {
        Self {
            source: ClientSource::SdkConfig(sdk_config),
        }
    }

    /// Uses fixed keys, as stored in a workflow credential.
    #[must_use]
    pub fn from_credentials(credentials: AwsCredentials) -> Self {
        Self {
            source: ClientSource::Credentials(credentials),
        }
    }

    /// Sends requests through `invoker` instead of the AWS SDK.
    #[must_use]
    pub fn with_invoker(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            source: ClientSource::Invoker(invoker),
        }
    }

    fn invoker(&self) -> Arc<dyn ModelInvoker> {
        let client = match &self.source {
            ClientSource::Invoker(invoker) => return Arc::clone(invoker),
            ClientSource::SdkConfig(config) => Client::new(config),
            ClientSource::Credentials(credentials) => credentials.client(),
            // Loading the default chain is async; run it on a private runtime so
            // this also works when the server is built inside another runtime.
            ClientSource::Env => Client::new(&std::thread::scope(|s| {
                s.spawn(|| {
                    tokio::runtime::Runtime::new()
                        .expect("cannot start a runtime to load the AWS config")
                        .block_on(aws_config::from_env().load())
                })
                .join()
                .expect("loading the AWS config panicked")
            })),
        };

        tracing::debug!(region = ?client.config().region(), "created bedrock client");
        Arc::new(BedrockInvoker::new(Arc::new(client)))
    }
}

impl Default for BedrockPlugin {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Plugin for BedrockPlugin {
    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<NodesPlugin>()]
    }

    fn build(&self, server: &mut Server) {
        let node = MultimodalInvokeNode::new(self.invoker());

        let Some(mut registry) = server.get_resource_mut::<NodeRegistry>() else {
            panic!("NodeRegistry not found. Make sure to add NodesPlugin before BedrockPlugin.");
        };

        registry.register_node(Arc::new(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedrock::InvokeError;

    #[test]
    fn debug_redacts_secrets() {
        let credentials = AwsCredentials::new("AKIAEXAMPLE", "very-secret", "eu-west-1")
            .with_session_token("token-value");

        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("token-value"));
    }

    #[test]
    fn credentials_deserialize_camel_case() {
        let credentials: AwsCredentials = serde_json::from_value(serde_json::json!({
            "accessKeyId": "AKIAEXAMPLE",
            "secretAccessKey": "secret",
            "region": "us-east-1",
            "endpoint": "https://bedrock.internal"
        }))
        .unwrap();

        assert_eq!(credentials.region, "us-east-1");
        assert_eq!(credentials.session_token, None);
        assert_eq!(credentials.endpoint.as_deref(), Some("https://bedrock.internal"));
    }

    #[test]
    fn static_credentials_configure_client() {
        let client = AwsCredentials::new("AKIAEXAMPLE", "secret", "ap-south-1").client();
        assert_eq!(
            client.config().region().map(ToString::to_string),
            Some("ap-south-1".to_string())
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_keeps_dispatch_cause() {
        let client = AwsCredentials::new("AKIAEXAMPLE", "secret", "us-east-1")
            .with_endpoint("http://127.0.0.1:1")
            .client();
        let invoker = BedrockInvoker::new(Arc::new(client));

        let err = invoker
            .invoke("anthropic.claude-3-haiku-20240307-v1:0", b"{}".to_vec())
            .await
            .unwrap_err();

        let InvokeError::Provider {
            status, message, ..
        } = &err
        else {
            panic!("expected a provider error, got {err:?}");
        };
        assert_eq!(*status, None);
        assert!(message.contains("dispatch failure"), "{message}");
        assert!(!err.to_string().contains("unhandled error"), "{err}");
    }
}
