//! Node descriptions: the schema a host UI renders for a node.
//!
//! A [`NodeDescription`] lists the node's parameters as [`NodeProperty`]
//! entries. Property defaults and numeric bounds are also what
//! [`ParameterResolver::get`](crate::ParameterResolver::get) falls back to and
//! enforces at run time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a node: identity, credentials, and parameters.
///
/// # Example
///
/// ```
/// use lumen_nodes::{NodeDescription, NodeProperty};
///
/// let description = NodeDescription::new("echo", "Echo")
///     .description("Returns its input")
///     .property(NodeProperty::string("prefix", "Prefix", ""))
///     .property(NodeProperty::number("repeat", "Repeat", 1).min(1.0).max(10.0));
///
/// assert_eq!(description.properties.len(), 2);
/// assert!(description.find_property("repeat").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    /// Unique machine name, used as the registry key.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// What the node does.
    #[serde(default)]
    pub description: String,
    /// Node version.
    pub version: u32,
    /// Palette group the node is listed under.
    #[serde(default)]
    pub group: String,
    /// Credentials the node needs from the host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRequirement>,
    /// Parameters, in display order.
    #[serde(default)]
    pub properties: Vec<NodeProperty>,
}

impl NodeDescription {
    /// Creates a description with no properties, version 1, group `transform`.
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            version: 1,
            group: "transform".to_string(),
            credentials: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Sets the description text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the node version.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the palette group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Declares a credential the node uses.
    #[must_use]
    pub fn credential(mut self, name: impl Into<String>, required: bool) -> Self {
        self.credentials.push(CredentialRequirement {
            name: name.into(),
            required,
        });
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn property(mut self, property: NodeProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A credential a node needs, by credential type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequirement {
    /// Credential type name, e.g. `aws`.
    pub name: String,
    /// Whether the node refuses to run without it.
    pub required: bool,
}

/// The value type of a parameter.
#[expect(missing_docs, reason = "variants are self-explanatory type names")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
}

/// A single node parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    /// Parameter key.
    pub name: String,
    /// Label shown in the UI.
    pub display_name: String,
    /// Value type.
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    /// Value used when the parameter is not set.
    pub default: Value,
    /// Whether the UI must collect a value.
    #[serde(default)]
    pub required: bool,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Display and validation hints.
    #[serde(default, skip_serializing_if = "TypeOptions::is_empty")]
    pub type_options: TypeOptions,
}

impl NodeProperty {
    fn with_kind(
        kind: PropertyKind,
        name: impl Into<String>,
        display_name: impl Into<String>,
        default: Value,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            kind,
            default,
            required: false,
            description: None,
            placeholder: None,
            type_options: TypeOptions::default(),
        }
    }

    /// A string parameter.
    #[must_use]
    pub fn string(
        name: impl Into<String>,
        display_name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            PropertyKind::String,
            name,
            display_name,
            Value::String(default.into()),
        )
    }

    /// A number parameter.
    #[must_use]
    pub fn number(
        name: impl Into<String>,
        display_name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self::with_kind(PropertyKind::Number, name, display_name, default.into())
    }

    /// A boolean parameter.
    #[must_use]
    pub fn boolean(name: impl Into<String>, display_name: impl Into<String>, default: bool) -> Self {
        Self::with_kind(
            PropertyKind::Boolean,
            name,
            display_name,
            Value::Bool(default),
        )
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the input placeholder.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the inclusive lower bound for a number parameter.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.type_options.min_value = Some(min);
        self
    }

    /// Sets the inclusive upper bound for a number parameter.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.type_options.max_value = Some(max);
        self
    }

    /// Sets the number of decimal places the UI offers.
    #[must_use]
    pub fn precision(mut self, digits: u32) -> Self {
        self.type_options.number_precision = Some(digits);
        self
    }

    /// Renders a string parameter as a multi-line input of `rows` lines.
    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.type_options.rows = Some(rows);
        self
    }
}

/// Optional display and validation hints for a parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOptions {
    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Decimal places offered by the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_precision: Option<u32>,
    /// Line count for multi-line strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

impl TypeOptions {
    /// Returns true if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Checks a number against the declared bounds.
    ///
    /// Returns a message describing the violation, if any.
    #[must_use]
    pub fn check_bounds(&self, value: f64) -> Option<String> {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) if !(min..=max).contains(&value) => {
                Some(format!("{value} is outside the range [{min}, {max}]"))
            }
            (Some(min), _) if value < min => Some(format!("{value} is below the minimum {min}")),
            (_, Some(max)) if value > max => Some(format!("{value} is above the maximum {max}")),
            _ => None,
        }
    }
}
