//! # Field Contracts
//!
//! The untyped half of a field's declaration: everything the binder needs
//! that does not depend on the field's Rust type. The typed half (slot
//! accessor, custom transform, and the ordered comparison/predicate chain)
//! lives with the binding in [`crate::binder`].

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::field::FieldType;

/// Declared requiredness of a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "presence", content = "default", rename_all = "kebab-case")]
pub enum Presence {
    Required,
    Optional,
    /// Optional, substituting the value when the input key is absent.
    OptionalWithDefault(Value),
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::Optional => f.write_str("optional"),
            Self::OptionalWithDefault(v) => write!(f, "optional (default {v})"),
        }
    }
}

/// Declared contract of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContract {
    pub name: String,
    /// Input key to read instead of `name`.
    pub source_key: Option<String>,
    /// `None` until declared; undeclared fields are optional.
    pub presence: Option<Presence>,
    pub field_type: FieldType,
    pub passthrough: bool,
    pub union: Option<Vec<Value>>,
    pub integer: bool,
}

impl FieldContract {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            source_key: None,
            presence: None,
            field_type,
            passthrough: false,
            union: None,
            integer: false,
        }
    }

    /// Key read from the input map.
    pub fn source_key(&self) -> &str {
        self.source_key.as_deref().unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Some(Presence::Required))
    }

    pub fn default_value(&self) -> Option<&Value> {
        match &self.presence {
            Some(Presence::OptionalWithDefault(v)) => Some(v),
            _ => None,
        }
    }

    /// Effective requiredness, with undeclared fields treated as optional.
    pub fn effective_presence(&self) -> Presence {
        self.presence.clone().unwrap_or(Presence::Optional)
    }
}
