//! Registry and execution tests using a mock node.

use async_trait::async_trait;
use lumen_nodes::{
    BinaryData, ExecutionContext, Item, Node, NodeDescription, NodeError, NodeParameters,
    NodeProperty, NodeRegistry, NodesPlugin, RegistryError,
};
use lumen_system::plugin::{Plugin, PluginId};
use lumen_system::server::Server;
use serde_json::json;
use std::sync::Arc;

/// Reports the size of a named attachment together with a label parameter.
struct MeasureNode;

#[async_trait]
impl Node for MeasureNode {
    fn description(&self) -> NodeDescription {
        NodeDescription::new("measure", "Measure")
            .property(NodeProperty::string("binaryPropertyName", "Binary Property", "data"))
            .property(NodeProperty::string("label", "Label", "").required())
            .property(NodeProperty::number("scale", "Scale", 1).min(1.0).max(10.0))
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Item>, NodeError> {
        let description = self.description();
        let params = ctx.resolver(&description);

        ctx.map_items(|index, item| {
            let result = (|| -> Result<_, NodeError> {
                let property: String = params.get("binaryPropertyName", index)?;
                let label: String = params.get("label", index)?;
                let scale: u64 = params.get("scale", index)?;
                let binary = item.binary(&property).ok_or(NodeError::MissingBinaryData {
                    property,
                    item_index: index,
                })?;
                Ok(json!({"label": label, "size": binary.data.len() as u64 * scale}))
            })();
            async move { result }
        })
        .await
    }
}

struct MeasurePlugin;

impl Plugin for MeasurePlugin {
    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<NodesPlugin>()]
    }

    fn build(&self, server: &mut Server) {
        let mut registry = server
            .get_resource_mut::<NodeRegistry>()
            .expect("NodesPlugin must be added before node plugins");
        registry.register_node(Arc::new(MeasureNode));
    }
}

fn server() -> Server {
    let mut server = Server::new();
    server.add_plugins(MeasurePlugin);
    server.add_plugins(NodesPlugin);
    server.finish();
    server
}

fn items() -> Vec<Item> {
    vec![
        Item::new(json!({"name": "a"})).with_binary("data", BinaryData::new(vec![0; 4], "image/png")),
        Item::new(json!({"name": "b"})),
        Item::new(json!({"name": "c"})).with_binary("data", BinaryData::new(vec![0; 2], "image/png")),
    ]
}

#[test]
fn registry_becomes_global_after_finish() {
    let server = server();

    assert!(!server.contains_resource::<NodeRegistry>());
    let registry = server.get_global::<NodeRegistry>().unwrap();
    assert_eq!(registry.node_names(), vec!["measure".to_string()]);
    assert_eq!(registry.descriptions()[0].properties.len(), 3);
}

#[test]
#[should_panic(expected = "node 'measure' is already registered")]
fn duplicate_node_names_panic() {
    let mut registry = NodeRegistry::new();
    registry.register_node(Arc::new(MeasureNode));
    registry.register_node(Arc::new(MeasureNode));
}

#[tokio::test]
async fn unknown_node_is_reported() {
    let server = server();
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let err = registry
        .execute("resize", &ExecutionContext::new(items()))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownNode(ref name) if name == "resize"));
}

#[tokio::test]
async fn first_failure_aborts_run() {
    let server = server();
    let registry = server.get_global::<NodeRegistry>().unwrap();
    let ctx = ExecutionContext::new(items())
        .with_parameters(NodeParameters::new().with("label", "={{ $json.name }}"));

    let err = registry.execute("measure", &ctx).await.unwrap_err();

    let RegistryError::Execution(NodeError::MissingBinaryData { property, item_index }) = &err
    else {
        panic!("expected missing binary data, got {err:?}");
    };
    assert_eq!(property, "data");
    assert_eq!(*item_index, 1);
}

#[tokio::test]
async fn continue_on_fail_keeps_order_and_count() {
    let server = server();
    let registry = server.get_global::<NodeRegistry>().unwrap();
    let ctx = ExecutionContext::new(items())
        .with_parameters(
            NodeParameters::new()
                .with("label", "={{ $json.name }}")
                .with("scale", 3),
        )
        .with_continue_on_fail(true);

    let out = registry.execute("measure", &ctx).await.unwrap();

    let payloads: Vec<_> = out.iter().map(Item::json_value).collect();
    assert_eq!(
        payloads,
        vec![
            json!({"label": "a", "size": 12}),
            json!({"error": "no binary data property \"data\" exists on item 1"}),
            json!({"label": "c", "size": 6}),
        ]
    );
    let pairs: Vec<_> = out.iter().map(|item| item.paired_item).collect();
    assert_eq!(pairs, vec![Some(0), Some(1), Some(2)]);
}

#[tokio::test]
async fn parameter_errors_follow_failure_policy() {
    let server = server();
    let registry = server.get_global::<NodeRegistry>().unwrap();
    let params = NodeParameters::new().with("label", "x").with("scale", 11);

    let err = registry
        .execute("measure", &ExecutionContext::new(items()).with_parameters(params.clone()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Execution(NodeError::InvalidParameter { item_index: 0, .. })
    ));

    let out = registry
        .execute(
            "measure",
            &ExecutionContext::new(items())
                .with_parameters(params)
                .with_continue_on_fail(true),
        )
        .await
        .unwrap();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|item| item.json.contains_key("error")));
}

#[tokio::test]
async fn empty_input_produces_empty_output() {
    let server = server();
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let out = registry
        .execute("measure", &ExecutionContext::new(Vec::new()))
        .await
        .unwrap();
    assert!(out.is_empty());
}
