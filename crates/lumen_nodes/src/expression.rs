//! Per-item parameter expressions.
//!
//! An expression is a template with `{{ ... }}` placeholders evaluated against
//! the item being processed:
//!
//! | Placeholder | Resolves to |
//! |-------------|-------------|
//! | `{{ $json.a.b }}` | Field `b` of object `a` in the item payload |
//! | `{{ $json.tags[0] }}` | First element of array `tags` |
//! | `{{ $json["odd key"] }}` | Field with a name that is not an identifier |
//! | `{{ $itemIndex }}` | Index of the item in the input sequence |
//!
//! A template made of exactly one placeholder yields the raw JSON value, so
//! numbers and booleans keep their type. Otherwise each placeholder is
//! stringified into the surrounding text. Missing fields resolve to `null`,
//! which interpolates as an empty string.

use crate::item::Item;
use serde_json::Value;

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// A `{{` without a matching `}}`.
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    /// The placeholder does not start with `$json` or `$itemIndex`.
    #[error("unknown expression root in '{0}'")]
    UnknownRoot(String),

    /// The field path after `$json` is malformed.
    #[error("invalid field path '{0}'")]
    InvalidPath(String),
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

#[derive(Debug, PartialEq)]
enum PathStep {
    Key(String),
    Index(usize),
}

/// Evaluates `template` against `item`, the `item_index`-th input item.
///
/// # Errors
///
/// Returns an [`ExpressionError`] if the template is malformed.
///
/// # Example
///
/// ```
/// use lumen_nodes::{Item, evaluate};
/// use serde_json::json;
///
/// let item = Item::new(json!({"question": "What is this?", "limit": 200}));
///
/// assert_eq!(evaluate("{{ $json.limit }}", &item, 0).unwrap(), json!(200));
/// assert_eq!(
///     evaluate("Q{{ $itemIndex }}: {{ $json.question }}", &item, 4).unwrap(),
///     json!("Q4: What is this?")
/// );
/// ```
pub fn evaluate(template: &str, item: &Item, item_index: usize) -> Result<Value, ExpressionError> {
    let segments = split(template)?;

    if let [Segment::Placeholder(expr)] = segments.as_slice() {
        return resolve(expr, item, item_index);
    }

    let mut out = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(expr) => match resolve(expr, item, item_index)? {
                Value::Null => {}
                Value::String(s) => out.push_str(&s),
                other => out.push_str(&other.to_string()),
            },
        }
    }
    Ok(Value::String(out))
}

fn split(template: &str) -> Result<Vec<Segment<'_>>, ExpressionError> {
    let mut segments = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }
        let inner_start = open + 2;
        let close = rest[inner_start..]
            .find("}}")
            .ok_or(ExpressionError::Unclosed(offset + open))?;
        segments.push(Segment::Placeholder(
            rest[inner_start..inner_start + close].trim(),
        ));

        let consumed = inner_start + close + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

fn resolve(expr: &str, item: &Item, item_index: usize) -> Result<Value, ExpressionError> {
    if expr == "$itemIndex" {
        return Ok(Value::from(item_index));
    }
    let Some(path) = expr.strip_prefix("$json") else {
        return Err(ExpressionError::UnknownRoot(expr.to_string()));
    };

    let steps = parse_path(path)?;
    let Some((first, tail)) = steps.split_first() else {
        return Ok(item.json_value());
    };

    let PathStep::Key(key) = first else {
        return Ok(Value::Null);
    };
    let mut current = item.json.get(key);
    for step in tail {
        current = current.and_then(|value| match step {
            PathStep::Key(key) => value.get(key.as_str()),
            PathStep::Index(index) => value.get(*index),
        });
    }
    Ok(current.cloned().unwrap_or(Value::Null))
}

fn parse_path(path: &str) -> Result<Vec<PathStep>, ExpressionError> {
    let invalid = || ExpressionError::InvalidPath(path.to_string());
    let mut steps = Vec::new();
    let mut rest = path.trim_end();

    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
            let key = &after_dot[..end];
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(invalid());
            }
            steps.push(PathStep::Key(key.to_string()));
            rest = &after_dot[end..];
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let end = after_bracket.find(']').ok_or_else(invalid)?;
            let inner = after_bracket[..end].trim();
            let quoted = inner
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));
            let step = match quoted {
                Some(key) => PathStep::Key(key.to_string()),
                None => PathStep::Index(inner.parse().map_err(|_| invalid())?),
            };
            steps.push(step);
            rest = &after_bracket[end + 1..];
        } else {
            return Err(invalid());
        }
    }
    Ok(steps)
}
