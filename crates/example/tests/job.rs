//! Runs a fixture job end to end against a stub transport.

use async_trait::async_trait;
use example::{CliError, Job, registry_snapshot};
use lumen_node_providers::BedrockPlugin;
use lumen_node_providers::bedrock::{InvokeError, ModelInvoker, NODE_NAME};
use lumen_nodes::{NodeRegistry, NodesPlugin};
use lumen_system::server::Server;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/job.json");

/// Replies with the media type and prompt it was sent.
struct EchoInvoker;

#[async_trait]
impl ModelInvoker for EchoInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Value, InvokeError> {
        let body: Value = serde_json::from_slice(&body).map_err(InvokeError::InvalidResponse)?;
        let content = &body["messages"][0]["content"];
        Ok(json!({
            "model": model_id,
            "max_tokens": body["max_tokens"],
            "media_type": content[0]["source"]["media_type"],
            "prompt": content[1]["text"],
        }))
    }
}

#[test]
fn fixture_attachments_resolve_relative_to_job() {
    let ctx = Job::load(FIXTURE).unwrap().into_context().unwrap();

    assert!(ctx.continue_on_fail());
    let image = ctx.items()[0].binary("data").unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.file_name.as_deref(), Some("red.png"));
    assert_eq!(
        image.data,
        std::fs::read(Path::new(FIXTURE).with_file_name("red.png")).unwrap()
    );
    assert!(ctx.items()[1].binary.is_empty());
}

#[tokio::test]
async fn fixture_job_runs_with_continue_on_fail() {
    let mut server = Server::new();
    server.add_plugins(NodesPlugin);
    server.add_plugins(BedrockPlugin::with_invoker(Arc::new(EchoInvoker)));
    server.finish();
    let registry = server.get_global::<NodeRegistry>().unwrap();

    let ctx = Job::load(FIXTURE).unwrap().into_context().unwrap();
    let output = registry.execute(NODE_NAME, &ctx).await.unwrap();

    assert_eq!(output.len(), 2);
    assert_eq!(
        output[0].json_value(),
        json!({
            "model": "anthropic.claude-3-haiku-20240307-v1:0",
            "max_tokens": 64,
            "media_type": "image/png",
            "prompt": "What colour is this?"
        })
    );
    assert_eq!(
        output[1].json_value(),
        json!({"error": "no binary data property \"data\" exists on item 1"})
    );
}

#[test]
fn unreadable_job_reports_path() {
    let err = Job::load("/nonexistent/job.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/job.json"));
}

#[tokio::test]
async fn registry_snapshot_leaves_server_unborrowed() {
    let mut server = Server::new();
    server.add_plugins(NodesPlugin);
    server.add_plugins(BedrockPlugin::with_invoker(Arc::new(EchoInvoker)));
    server.finish();

    let registry = registry_snapshot(&server).unwrap();
    server.insert_global(NodeRegistry::new());

    let ctx = Job::load(FIXTURE).unwrap().into_context().unwrap();
    let output = registry.execute(NODE_NAME, &ctx).await.unwrap();

    assert_eq!(output.len(), 2);
    assert!(!server.get_global::<NodeRegistry>().unwrap().has_node(NODE_NAME));
}

#[test]
fn registry_snapshot_requires_nodes_plugin() {
    let mut server = Server::new();
    server.finish();

    assert!(matches!(registry_snapshot(&server), Err(CliError::NoRegistry)));
}
