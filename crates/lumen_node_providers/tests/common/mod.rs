//! Shared helpers for provider tests.

#![expect(dead_code, reason = "each test binary uses a different subset of helpers")]

use async_trait::async_trait;
use lumen_node_providers::bedrock::{InvokeError, ModelInvoker};
use lumen_nodes::{BinaryData, Item, NodeRegistry, NodesPlugin};
use lumen_system::server::Server;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize environment variables from `.env` file (once).
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// A small 10x10 red PNG image encoded as base64.
pub const RED_SQUARE_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAoAAAAKCAIAAAACUFjqAAAAEklEQVR4nGP4z8CAB+GTG8HSALfKY52fTcuYAAAAAElFTkSuQmCC";

/// A recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub model_id: String,
    pub body: Value,
}

/// A [`ModelInvoker`] that records each call and replies from a script.
///
/// Models named in `failing` answer with a provider error. Every other call
/// returns a canned response echoing the call number.
#[derive(Default)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<Call>>,
    failing: Vec<String>,
}

impl RecordingInvoker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_for(models: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failing: models.iter().map(ToString::to_string).collect(),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ModelInvoker for RecordingInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Value, InvokeError> {
        let body: Value = serde_json::from_slice(&body).map_err(InvokeError::Request)?;
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(Call {
                model_id: model_id.to_string(),
                body,
            });
            calls.len()
        };

        if self.failing.iter().any(|m| m == model_id) {
            return Err(InvokeError::Provider {
                status: Some(400),
                message: format!("ValidationException: model {model_id} is not supported"),
                source: None,
            });
        }

        Ok(json!({
            "id": format!("msg_{call_number}"),
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": format!("reply {call_number}")}],
            "stop_reason": "end_turn"
        }))
    }
}

/// Builds a finished server with `plugin` registered after [`NodesPlugin`].
pub fn server_with(plugin: lumen_node_providers::BedrockPlugin) -> Server {
    let mut server = Server::new();
    server.add_plugins(NodesPlugin);
    server.add_plugins(plugin);
    server.finish();
    assert!(server.contains_global::<NodeRegistry>());
    server
}

/// An item carrying the red square under `property`.
pub fn image_item(json: Value, property: &str) -> Item {
    let image: BinaryData = serde_json::from_value(json!({
        "data": RED_SQUARE_PNG_BASE64,
        "mimeType": "image/png",
        "fileName": "red.png"
    }))
    .expect("fixture image is valid");
    Item::new(json).with_binary(property, image)
}
