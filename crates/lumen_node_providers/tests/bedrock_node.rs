//! Behaviour of the multimodal invoke node against a recording transport.

#![cfg(feature = "bedrock")]

mod common;

use common::{RED_SQUARE_PNG_BASE64, RecordingInvoker, image_item, server_with};
use lumen_node_providers::BedrockPlugin;
use lumen_node_providers::bedrock::{ANTHROPIC_VERSION, NODE_NAME};
use lumen_nodes::{ExecutionContext, Item, NodeError, NodeParameters, NodeRegistry, RegistryError};
use serde_json::json;

const MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";

fn params() -> NodeParameters {
    NodeParameters::new()
        .with("modelId", MODEL)
        .with("prompt", "Describe this image")
}

#[tokio::test]
async fn builds_documented_body_with_defaults() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = ExecutionContext::new(vec![image_item(json!({}), "data")]).with_parameters(params());
    let out = registry.execute(NODE_NAME, &ctx).await.unwrap();

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model_id, MODEL);
    assert_eq!(
        calls[0].body,
        json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": 1024,
            "temperature": 0.5,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": "image/png",
                            "data": RED_SQUARE_PNG_BASE64
                        }
                    },
                    {"type": "text", "text": "Describe this image"}
                ]
            }]
        })
    );

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].json["id"], "msg_1");
    assert_eq!(out[0].paired_item, Some(0));
}

#[tokio::test]
async fn outputs_follow_input_order() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let items = (0..3)
        .map(|n| image_item(json!({"question": format!("question {n}")}), "data"))
        .collect();
    let ctx = ExecutionContext::new(items).with_parameters(
        NodeParameters::new()
            .with("modelId", MODEL)
            .with("prompt", "={{ $json.question }}"),
    );

    let out = registry.execute(NODE_NAME, &ctx).await.unwrap();

    let replies: Vec<_> = out.iter().map(|item| item.json["id"].clone()).collect();
    assert_eq!(replies, vec![json!("msg_1"), json!("msg_2"), json!("msg_3")]);

    let prompts: Vec<_> = invoker
        .calls()
        .iter()
        .map(|call| call.body["messages"][0]["content"][1]["text"].clone())
        .collect();
    assert_eq!(
        prompts,
        vec![json!("question 0"), json!("question 1"), json!("question 2")]
    );
}

#[tokio::test]
async fn custom_property_and_numeric_parameters() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = ExecutionContext::new(vec![image_item(json!({"t": 0.1}), "photo")]).with_parameters(
        params()
            .with("binaryPropertyName", "photo")
            .with("maxTokens", 200)
            .with("temperature", "={{ $json.t }}"),
    );

    registry.execute(NODE_NAME, &ctx).await.unwrap();

    let body = &invoker.calls()[0].body;
    assert_eq!(body["max_tokens"], 200);
    assert_eq!(body["temperature"], 0.1);
}

#[tokio::test]
async fn missing_binary_aborts_without_continue_on_fail() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = ExecutionContext::new(vec![
        image_item(json!({}), "data"),
        Item::new(json!({"no": "image"})),
        image_item(json!({}), "data"),
    ])
    .with_parameters(params());

    let err = registry.execute(NODE_NAME, &ctx).await.unwrap_err();

    assert!(matches!(
        err,
        RegistryError::Execution(NodeError::MissingBinaryData { item_index: 1, ref property })
            if property == "data"
    ));
    assert_eq!(invoker.calls().len(), 1, "the run stops at the failing item");
}

#[tokio::test]
async fn missing_binary_becomes_error_item_with_continue_on_fail() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = ExecutionContext::new(vec![
        image_item(json!({}), "data"),
        Item::new(json!({"no": "image"})),
        image_item(json!({}), "data"),
    ])
    .with_parameters(params())
    .with_continue_on_fail(true);

    let out = registry.execute(NODE_NAME, &ctx).await.unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].json["id"], "msg_1");
    assert_eq!(
        out[1].json_value(),
        json!({"error": "no binary data property \"data\" exists on item 1"})
    );
    assert_eq!(out[2].json["id"], "msg_2");
    assert_eq!(invoker.calls().len(), 2);
}

#[tokio::test]
async fn provider_errors_follow_failure_policy() {
    let invoker = RecordingInvoker::failing_for(&["bad-model"]);
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let items = vec![
        image_item(json!({"model": MODEL}), "data"),
        image_item(json!({"model": "bad-model"}), "data"),
    ];
    let parameters = params().with("modelId", "={{ $json.model }}");

    let err = registry
        .execute(
            NODE_NAME,
            &ExecutionContext::new(items.clone()).with_parameters(parameters.clone()),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Execution(NodeError::Operation { item_index: Some(1), .. })
    ));

    let out = registry
        .execute(
            NODE_NAME,
            &ExecutionContext::new(items)
                .with_parameters(parameters)
                .with_continue_on_fail(true),
        )
        .await
        .unwrap();
    assert_eq!(
        out[1].json_value(),
        json!({"error": "provider error (400): ValidationException: model bad-model is not supported"})
    );
}

#[tokio::test]
async fn out_of_range_temperature_is_rejected_per_item() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = ExecutionContext::new(vec![
        image_item(json!({"t": 0.3}), "data"),
        image_item(json!({"t": 1.7}), "data"),
    ])
    .with_parameters(params().with("temperature", "={{ $json.t }}"))
    .with_continue_on_fail(true);

    let out = registry.execute(NODE_NAME, &ctx).await.unwrap();

    assert_eq!(out[0].json["id"], "msg_1");
    let message = out[1].json["error"].as_str().unwrap();
    assert!(message.contains("temperature"), "{message}");
    assert!(message.contains("[0, 1]"), "{message}");
    assert_eq!(invoker.calls().len(), 1);
}

#[tokio::test]
async fn missing_model_id_is_invalid() {
    let invoker = RecordingInvoker::new();
    let server = server_with(BedrockPlugin::with_invoker(invoker.clone()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = ExecutionContext::new(vec![image_item(json!({}), "data")])
        .with_parameters(NodeParameters::new().with("prompt", "hi"));

    let err = registry.execute(NODE_NAME, &ctx).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Execution(NodeError::InvalidParameter { ref name, .. }) if name == "modelId"
    ));
    assert!(invoker.calls().is_empty());
}

#[test]
fn description_is_listed_by_registry() {
    let server = server_with(BedrockPlugin::with_invoker(RecordingInvoker::new()));
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let descriptions = registry.descriptions();
    assert_eq!(descriptions.len(), 1);
    assert_eq!(descriptions[0].name, NODE_NAME);

    let schema = serde_json::to_value(&descriptions[0]).unwrap();
    assert_eq!(schema["properties"][4]["typeOptions"]["maxValue"], 1.0);
}
