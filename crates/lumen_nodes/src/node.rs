//! The [`Node`] trait.

use crate::context::ExecutionContext;
use crate::description::NodeDescription;
use crate::error::NodeError;
use crate::item::Item;
use async_trait::async_trait;

/// A workflow step that turns input items into output items.
///
/// Implementations describe their parameters through [`Node::description`]
/// and read them at run time with
/// [`ExecutionContext::resolver`]. Most nodes produce exactly one output item
/// per input item and can delegate the loop and failure policy to
/// [`ExecutionContext::map_items`].
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use lumen_nodes::{ExecutionContext, Item, Node, NodeDescription, NodeError, NodeProperty};
/// use serde_json::json;
///
/// struct Shout;
///
/// #[async_trait]
/// impl Node for Shout {
///     fn description(&self) -> NodeDescription {
///         NodeDescription::new("shout", "Shout")
///             .property(NodeProperty::string("text", "Text", "hello"))
///     }
///
///     async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Item>, NodeError> {
///         let description = self.description();
///         let params = ctx.resolver(&description);
///         ctx.map_items(|index, _item| {
///             let text = params.get::<String>("text", index);
///             async move { text.map(|t| json!({"text": t.to_uppercase()})) }
///         })
///         .await
///     }
/// }
///
/// # tokio_test(async {
/// let ctx = ExecutionContext::new(vec![Item::default()]);
/// let out = Shout.execute(&ctx).await.unwrap();
/// assert_eq!(out[0].json["text"], "HELLO");
/// # });
/// # fn tokio_test<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[async_trait]
pub trait Node: Send + Sync + 'static {
    /// Returns the node's identity and parameter schema.
    fn description(&self) -> NodeDescription;

    /// Processes the context's input items.
    ///
    /// # Errors
    ///
    /// Returns the first item error when the context does not continue on
    /// failure.
    async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Item>, NodeError>;
}
