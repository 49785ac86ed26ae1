//! Error types for node execution and the node registry.

/// Errors raised while a node processes items.
///
/// Every variant that concerns a single input item records its index, so a
/// host can point at the offending item.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The item has no attachment under the configured property name.
    #[error("no binary data property \"{property}\" exists on item {item_index}")]
    MissingBinaryData {
        /// The attachment name that was looked up.
        property: String,
        /// Index of the offending input item.
        item_index: usize,
    },

    /// A parameter could not be resolved, was out of range, or had the wrong type.
    #[error("invalid parameter '{name}' on item {item_index}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Index of the offending input item.
        item_index: usize,
        /// What was wrong with it.
        message: String,
    },

    /// The node's operation failed (e.g. the remote call was rejected).
    #[error("{message}")]
    Operation {
        /// Index of the input item being processed, if any.
        item_index: Option<usize>,
        /// Error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl NodeError {
    /// Builds an [`NodeError::Operation`] for an item from an underlying error.
    pub fn operation(
        item_index: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Operation {
            item_index: Some(item_index),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the index of the input item the error concerns, if any.
    #[must_use]
    pub fn item_index(&self) -> Option<usize> {
        match self {
            Self::MissingBinaryData { item_index, .. }
            | Self::InvalidParameter { item_index, .. } => Some(*item_index),
            Self::Operation { item_index, .. } => *item_index,
        }
    }
}

/// Errors looking up a node in the [`NodeRegistry`](crate::NodeRegistry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No node is registered under this name.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The node was found but its execution failed.
    #[error(transparent)]
    Execution(#[from] NodeError),
}
