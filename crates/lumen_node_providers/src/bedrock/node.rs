//! The multimodal invoke node.

use super::error::InvokeError;
use super::invoker::ModelInvoker;
use super::request::InvokeRequest;
use async_trait::async_trait;
use lumen_nodes::{
    ExecutionContext, Item, Node, NodeDescription, NodeError, NodeProperty, ParameterResolver,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

/// Registry name of [`MultimodalInvokeNode`].
pub const NODE_NAME: &str = "bedrockMultimodalInvoke";

/// Sends an image attachment and a prompt to a Bedrock model, once per item.
///
/// # Parameters
///
/// | Name | Type | Default | Notes |
/// |------|------|---------|-------|
/// | `modelId` | string | | Required |
/// | `prompt` | string | | Required |
/// | `binaryPropertyName` | string | `data` | Attachment holding the image |
/// | `maxTokens` | number | `1024` | At least 1 |
/// | `temperature` | number | `0.5` | Within `[0, 1]` |
///
/// Every parameter may be an expression and is resolved per item. Each output
/// item is the model's JSON response body, unchanged.
///
/// An item without the named attachment fails with
/// [`NodeError::MissingBinaryData`]. Failures then follow the context's
/// continue-on-fail policy.
pub struct MultimodalInvokeNode {
    invoker: Arc<dyn ModelInvoker>,
}

impl MultimodalInvokeNode {
    /// Creates the node on top of `invoker`.
    #[must_use]
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    async fn invoke_item(
        &self,
        params: &ParameterResolver<'_>,
        index: usize,
        item: &Item,
    ) -> Result<Value, NodeError> {
        let model_id: String = params.get("modelId", index)?;
        let prompt: String = params.get("prompt", index)?;
        let property: String = params.get("binaryPropertyName", index)?;
        let max_tokens: u32 = params.get("maxTokens", index)?;
        let temperature: f64 = params.get("temperature", index)?;

        let Some(image) = item.binary(&property) else {
            return Err(NodeError::MissingBinaryData {
                property,
                item_index: index,
            });
        };

        let body = InvokeRequest::image_prompt(image, prompt, max_tokens, temperature)
            .to_vec()
            .map_err(|err| NodeError::operation(index, InvokeError::Request(err)))?;

        let span = tracing::info_span!("invoke", item_index = index, model_id = %model_id);
        self.invoker
            .invoke(&model_id, body)
            .instrument(span)
            .await
            .map_err(|err| NodeError::operation(index, err))
    }
}

impl core::fmt::Debug for MultimodalInvokeNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MultimodalInvokeNode").finish_non_exhaustive()
    }
}

#[async_trait]
impl Node for MultimodalInvokeNode {
    fn description(&self) -> NodeDescription {
        NodeDescription::new(NODE_NAME, "AWS Bedrock Multimodal")
            .description("Send an image and a prompt to a multimodal model on AWS Bedrock")
            .group("ai")
            .credential("aws", true)
            .property(
                NodeProperty::string("modelId", "Model ID", "")
                    .required()
                    .placeholder("anthropic.claude-3-5-sonnet-20240620-v1:0")
                    .description("Identifier of the Bedrock model to invoke"),
            )
            .property(
                NodeProperty::string("prompt", "Prompt", "")
                    .required()
                    .rows(4)
                    .description("Text sent after the image"),
            )
            .property(
                NodeProperty::string("binaryPropertyName", "Binary Property", "data")
                    .description("Name of the binary attachment holding the image"),
            )
            .property(
                NodeProperty::number("maxTokens", "Max Tokens", 1024)
                    .min(1.0)
                    .description("Maximum number of tokens to generate"),
            )
            .property(
                NodeProperty::number("temperature", "Temperature", 0.5)
                    .min(0.0)
                    .max(1.0)
                    .precision(2)
                    .description("Sampling temperature"),
            )
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Item>, NodeError> {
        let description = self.description();
        let params = ctx.resolver(&description);

        ctx.map_items(|index, item| self.invoke_item(&params, index, item))
            .await
    }
}
