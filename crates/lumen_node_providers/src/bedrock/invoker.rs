//! Transport for `InvokeModel` calls.

use super::error::InvokeError;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_smithy_types::Blob;
use aws_smithy_types::error::display::DisplayErrorContext;
use serde_json::Value;
use std::sync::Arc;

/// Sends a serialized request body to a model and returns the parsed response.
///
/// Implementations own signing and transport. The body is already JSON.
#[async_trait]
pub trait ModelInvoker: Send + Sync + 'static {
    /// Invokes `model_id` with `body` and parses the JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Provider`] if the call fails, or
    /// [`InvokeError::InvalidResponse`] if the response is not JSON.
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Value, InvokeError>;
}

/// [`ModelInvoker`] backed by the AWS Bedrock runtime client.
///
/// Issues `POST /model/{modelId}/invoke` with `Content-Type` and `Accept` set
/// to `application/json`. Requests are SigV4-signed by the SDK using the
/// client's credentials.
#[derive(Debug, Clone)]
pub struct BedrockInvoker {
    client: Arc<Client>,
}

impl BedrockInvoker {
    /// Creates an invoker with an already-initialized client.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Value, InvokeError> {
        tracing::debug!(model_id, bytes = body.len(), "invoking bedrock model");

        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(provider_error)?;

        serde_json::from_slice(output.body().as_ref()).map_err(InvokeError::InvalidResponse)
    }
}

/// Service errors report `code: message`. Transport failures (dispatch,
/// timeout, unparseable response) report the full error chain.
fn provider_error(err: SdkError<InvokeModelError>) -> InvokeError {
    let status = err.raw_response().map(|r| r.status().as_u16());
    match err {
        SdkError::ServiceError(context) => {
            let service_err = context.into_err();
            let message = match (service_err.code(), service_err.message()) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (None, Some(message)) => message.to_string(),
                _ => service_err.to_string(),
            };
            InvokeError::Provider {
                status,
                message,
                source: Some(Box::new(service_err)),
            }
        }
        other => InvokeError::Provider {
            status,
            message: DisplayErrorContext(&other).to_string(),
            source: Some(Box::new(other)),
        },
    }
}
