//! Execution context handed to a node for one run.

use crate::description::{NodeDescription, PropertyKind};
use crate::error::NodeError;
use crate::item::Item;
use crate::parameters::NodeParameters;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Everything a node needs for one run: the input items, the configured
/// parameters, and the failure policy.
///
/// # Failure policy
///
/// With `continue_on_fail` off (the default) the first failing item aborts the
/// run. With it on, a failing item is replaced in the output by
/// `{"error": "<message>"}` and processing moves on to the next item. See
/// [`map_items`](Self::map_items).
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    items: Vec<Item>,
    parameters: NodeParameters,
    continue_on_fail: bool,
}

impl ExecutionContext {
    /// Creates a context over the given input items.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Sets the node parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: NodeParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    /// Returns the input items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the configured parameters.
    #[must_use]
    pub fn parameters(&self) -> &NodeParameters {
        &self.parameters
    }

    /// Returns whether failing items are turned into error items.
    #[must_use]
    pub fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    /// Returns a resolver that reads parameters against `description`.
    #[must_use]
    pub fn resolver<'a>(&'a self, description: &'a NodeDescription) -> ParameterResolver<'a> {
        ParameterResolver {
            ctx: self,
            description,
        }
    }

    /// Runs `f` over every input item in order and collects the results.
    ///
    /// Each `Ok` value becomes an output item paired with its input index.
    /// Errors follow the context's failure policy.
    ///
    /// # Errors
    ///
    /// Returns the first item error when `continue_on_fail` is off.
    pub async fn map_items<'a, F, Fut>(&'a self, mut f: F) -> Result<Vec<Item>, NodeError>
    where
        F: FnMut(usize, &'a Item) -> Fut,
        Fut: Future<Output = Result<Value, NodeError>>,
    {
        let mut output = Vec::with_capacity(self.items.len());

        for (index, item) in self.items.iter().enumerate() {
            match f(index, item).await {
                Ok(json) => output.push(Item::new(json).paired_with(index)),
                Err(err) if self.continue_on_fail => {
                    tracing::warn!(item_index = index, error = %err, "item failed, continuing");
                    output.push(Item::error(err.to_string()).paired_with(index));
                }
                Err(err) => {
                    tracing::error!(item_index = index, error = %err, "item failed, aborting run");
                    return Err(err);
                }
            }
        }

        Ok(output)
    }
}

/// Reads typed parameter values for individual items.
///
/// Resolution order for a parameter on item `i`:
///
/// 1. The configured value, with expressions evaluated against item `i`
/// 2. Otherwise the property default from the node description
///
/// Number properties accept numeric strings, and are checked against the
/// bounds declared in their [`TypeOptions`](crate::TypeOptions). Required
/// properties reject `null` and empty strings.
pub struct ParameterResolver<'a> {
    ctx: &'a ExecutionContext,
    description: &'a NodeDescription,
}

impl ParameterResolver<'_> {
    /// Resolves parameter `name` for item `item_index` and deserializes it.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidParameter`] if the expression fails, the
    /// value violates the property's constraints, or it does not deserialize
    /// into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str, item_index: usize) -> Result<T, NodeError> {
        let invalid = |message: String| NodeError::InvalidParameter {
            name: name.to_string(),
            item_index,
            message,
        };

        let property = self.description.find_property(name);
        let item = self.ctx.items.get(item_index).ok_or_else(|| {
            invalid(format!(
                "item index out of range ({} items)",
                self.ctx.items.len()
            ))
        })?;

        let mut value = match self.ctx.parameters.get(name) {
            Some(configured) => configured
                .resolve(item, item_index)
                .map_err(|err| invalid(err.to_string()))?,
            None => property.map_or(Value::Null, |p| p.default.clone()),
        };

        if let Some(property) = property {
            if property.required && is_blank(&value) {
                return Err(invalid("a value is required".to_string()));
            }

            if property.kind == PropertyKind::Number {
                value = coerce_number(value).map_err(invalid)?;
                if let Some(message) = value
                    .as_f64()
                    .and_then(|n| property.type_options.check_bounds(n))
                {
                    return Err(invalid(message));
                }
            }
        }

        serde_json::from_value(value).map_err(|err| invalid(err.to_string()))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coerce_number(value: Value) -> Result<Value, String> {
    match value {
        Value::Number(n) if n.is_f64() => Ok(integral(n.as_f64().unwrap_or(f64::NAN))),
        Value::Number(_) | Value::Null => Ok(value),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| trimmed.parse::<f64>().map(integral))
                .map_err(|_| format!("expected a number, got '{s}'"))
        }
        other => Err(format!("expected a number, got {other}")),
    }
}

/// `1024.0` becomes `1024` so integer parameters accept it.
fn integral(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
