//! Errors from invoking a model.

/// Errors returned by a [`ModelInvoker`](super::ModelInvoker).
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Request(#[source] serde_json::Error),

    /// The provider rejected the request or could not be reached.
    #[error("provider error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        /// HTTP status code if a response was received.
        status: Option<u16>,
        /// Error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The response body was not valid JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_includes_status_when_known() {
        let with_status = InvokeError::Provider {
            status: Some(403),
            message: "AccessDeniedException: not authorized".into(),
            source: None,
        };
        assert_eq!(
            with_status.to_string(),
            "provider error (403): AccessDeniedException: not authorized"
        );

        let without = InvokeError::Provider {
            status: None,
            message: "dispatch failure".into(),
            source: None,
        };
        assert_eq!(without.to_string(), "provider error: dispatch failure");
    }
}
