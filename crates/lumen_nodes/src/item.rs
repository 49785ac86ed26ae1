//! Workflow items: the unit of data flowing between nodes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ─────────────────────
// Binary attachments
// ─────────────────────

/// A binary attachment carried by an [`Item`].
///
/// Serialized as `{"data": "<base64>", "mimeType": "...", "fileName": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    /// Raw attachment bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Declared MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Original file name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl BinaryData {
    /// Creates an attachment from raw bytes and a MIME type.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    /// Sets the original file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Returns the attachment bytes encoded as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

mod base64_bytes {
    use super::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// ─────────────────────
// Items
// ─────────────────────

/// One entry of the ordered sequence a node consumes and produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Structured payload.
    #[serde(default)]
    pub json: Map<String, Value>,
    /// Named binary attachments.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binary: BTreeMap<String, BinaryData>,
    /// Index of the input item this item was produced from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<usize>,
}

impl Item {
    /// Creates an item from a JSON value.
    ///
    /// Objects become the item payload directly; any other value is stored
    /// under a `data` key.
    #[must_use]
    pub fn new(json: Value) -> Self {
        let json = match json {
            Value::Object(map) => map,
            other => Map::from_iter([("data".to_string(), other)]),
        };
        Self {
            json,
            ..Self::default()
        }
    }

    /// Creates an item holding only `{"error": message}`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(serde_json::json!({ "error": message.into() }))
    }

    /// Attaches a binary under `name`, replacing any existing one.
    #[must_use]
    pub fn with_binary(mut self, name: impl Into<String>, data: BinaryData) -> Self {
        self.binary.insert(name.into(), data);
        self
    }

    /// Records the input item index this item derives from.
    #[must_use]
    pub fn paired_with(mut self, index: usize) -> Self {
        self.paired_item = Some(index);
        self
    }

    /// Returns the attachment stored under `name`.
    #[must_use]
    pub fn binary(&self, name: &str) -> Option<&BinaryData> {
        self.binary.get(name)
    }

    /// Returns the payload as a JSON object value.
    #[must_use]
    pub fn json_value(&self) -> Value {
        Value::Object(self.json.clone())
    }
}
