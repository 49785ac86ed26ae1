//! Node parameter values.

use crate::expression::{ExpressionError, evaluate};
use crate::item::Item;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A configured parameter value.
///
/// In serialized form a string starting with `=` is an expression, any other
/// JSON value is fixed: `"={{ $json.prompt }}"` vs `"Describe this"`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// The same value for every item.
    Fixed(Value),
    /// A template evaluated per item. Stored without the leading `=`.
    Expression(String),
}

impl ParameterValue {
    /// Classifies a raw JSON value, treating `=`-prefixed strings as expressions.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => match s.strip_prefix('=') {
                Some(expr) => Self::Expression(expr.to_string()),
                None => Self::Fixed(Value::String(s)),
            },
            other => Self::Fixed(other),
        }
    }

    /// Resolves the value for one item.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] if the expression is malformed.
    pub fn resolve(&self, item: &Item, item_index: usize) -> Result<Value, ExpressionError> {
        match self {
            Self::Fixed(value) => Ok(value.clone()),
            Self::Expression(template) => evaluate(template, item, item_index),
        }
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Fixed(value) => value.serialize(serializer),
            Self::Expression(expr) => serializer.serialize_str(&format!("={expr}")),
        }
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// The parameters configured on a node, by name.
///
/// ```
/// use lumen_nodes::{NodeParameters, ParameterValue};
/// use serde_json::json;
///
/// let params: NodeParameters = serde_json::from_value(json!({
///     "prompt": "={{ $json.question }}",
///     "maxTokens": 512
/// }))
/// .unwrap();
///
/// assert_eq!(
///     params.get("prompt"),
///     Some(&ParameterValue::Expression("{{ $json.question }}".into()))
/// );
/// assert_eq!(params.get("maxTokens"), Some(&ParameterValue::Fixed(json!(512))));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeParameters(BTreeMap<String, ParameterValue>);

impl NodeParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter from a raw JSON value (see [`ParameterValue::from_value`]).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, ParameterValue::from_value(value.into()));
        self
    }

    /// Sets a parameter.
    pub fn set(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.0.insert(name.into(), value);
    }

    /// Returns a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    /// Returns the number of configured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no parameters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
