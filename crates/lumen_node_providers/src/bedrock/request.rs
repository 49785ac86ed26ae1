//! Request body for Anthropic models on the Bedrock `InvokeModel` API.

use lumen_nodes::BinaryData;
use serde::{Deserialize, Serialize};

/// Protocol version tag Bedrock expects for Anthropic message bodies.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// An `InvokeModel` request body.
///
/// ```
/// use lumen_node_providers::bedrock::InvokeRequest;
/// use lumen_nodes::BinaryData;
/// use serde_json::json;
///
/// let image = BinaryData::new(vec![1, 2, 3], "image/png");
/// let request = InvokeRequest::image_prompt(&image, "What is shown?", 256, 0.2);
///
/// assert_eq!(
///     serde_json::to_value(&request).unwrap(),
///     json!({
///         "anthropic_version": "bedrock-2023-05-31",
///         "max_tokens": 256,
///         "temperature": 0.2,
///         "messages": [{
///             "role": "user",
///             "content": [
///                 {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AQID"}},
///                 {"type": "text", "text": "What is shown?"}
///             ]
///         }]
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Protocol version, always [`ANTHROPIC_VERSION`].
    pub anthropic_version: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f64,
    /// Conversation turns.
    pub messages: Vec<Message>,
}

impl InvokeRequest {
    /// Builds a single user turn holding `image` followed by `prompt`.
    #[must_use]
    pub fn image_prompt(
        image: &BinaryData,
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            max_tokens,
            temperature,
            messages: vec![Message {
                role: Role::User,
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource::Base64 {
                            media_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                    ContentBlock::Text {
                        text: prompt.into(),
                    },
                ],
            }],
        }
    }

    /// Serializes the body to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the turn.
    pub role: Role,
    /// Content blocks, in order.
    pub content: Vec<ContentBlock>,
}

/// Conversation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller.
    User,
    /// The model.
    Assistant,
}

/// A content block inside a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// An inline image.
    Image {
        /// Where the image bytes come from.
        source: ImageSource,
    },
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
}

/// Image payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageSource {
    /// Base64-encoded bytes.
    Base64 {
        /// MIME type, e.g. `image/jpeg`.
        media_type: String,
        /// Base64 (standard alphabet, padded) image bytes.
        data: String,
    },
}
