//! # YAML Input Trees
//!
//! Binding consumes `serde_json::Value` trees. YAML documents parsed with
//! `serde_yaml` use the JSON-compatible subset in practice, so they are
//! converted structurally before binding. Tags are dropped and scalar map
//! keys are stringified.
//!
//! A node with no JSON equivalent fails the conversion with its location
//! in the document, written `$` for the root, `.key` for a map entry and
//! `[i]` for a sequence element (`$.books[2].rating`).

use std::fmt;

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use thiserror::Error;

/// A YAML node with no JSON equivalent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YamlError {
    #[error("{path}: float {value} has no JSON representation")]
    NonFiniteFloat { path: String, value: f64 },

    #[error("{path}: unsupported YAML number {number}")]
    UnsupportedNumber { path: String, number: String },

    #[error("{path}: map key {key} is not a scalar")]
    UnsupportedKey { path: String, key: String },
}

impl YamlError {
    /// Location of the offending node.
    pub fn path(&self) -> &str {
        match self {
            Self::NonFiniteFloat { path, .. }
            | Self::UnsupportedNumber { path, .. }
            | Self::UnsupportedKey { path, .. } => path.as_str(),
        }
    }
}

/// Location of the node being converted, rendered only on failure.
#[derive(Debug, Clone, Copy)]
enum NodePath<'a> {
    Root,
    Key(&'a NodePath<'a>, &'a str),
    Index(&'a NodePath<'a>, usize),
}

impl fmt::Display for NodePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("$"),
            Self::Key(parent, key) => write!(f, "{parent}.{key}"),
            Self::Index(parent, index) => write!(f, "{parent}[{index}]"),
        }
    }
}

/// Convert a parsed YAML document into the JSON tree the binder reads.
pub fn yaml_to_json_value(yaml: &YamlValue) -> Result<Value, YamlError> {
    convert(yaml, NodePath::Root)
}

fn convert(node: &YamlValue, path: NodePath<'_>) -> Result<Value, YamlError> {
    match node {
        YamlValue::Null => Ok(Value::Null),
        YamlValue::Bool(b) => Ok(Value::Bool(*b)),
        YamlValue::Number(n) => convert_number(n, &path),
        YamlValue::String(s) => Ok(Value::String(s.clone())),
        YamlValue::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                out.push(convert(item, NodePath::Index(&path, index))?);
            }
            Ok(Value::Array(out))
        }
        YamlValue::Mapping(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let Some(key) = scalar_key(key) else {
                    return Err(YamlError::UnsupportedKey {
                        path: path.to_string(),
                        key: format!("{key:?}"),
                    });
                };
                let value = convert(value, NodePath::Key(&path, &key))?;
                out.insert(key, value);
            }
            Ok(Value::Object(out))
        }
        YamlValue::Tagged(tagged) => convert(&tagged.value, path),
    }
}

fn convert_number(n: &serde_yaml::Number, path: &NodePath<'_>) -> Result<Value, YamlError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    match n.as_f64() {
        Some(value) => Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| YamlError::NonFiniteFloat {
                path: path.to_string(),
                value,
            }),
        None => Err(YamlError::UnsupportedNumber {
            path: path.to_string(),
            number: n.to_string(),
        }),
    }
}

/// JSON object keys are strings; other scalars use their text form.
fn scalar_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Tagged(tagged) => scalar_key(&tagged.value),
        _ => None,
    }
}
