//! # Primitive Coercion
//!
//! Conversion functions applied to raw input values before the binder's
//! kind check, plus the coercing equality used by `eq`/`ne` validators and
//! union membership.
//!
//! ## Coercion Rules
//!
//! The conversions follow dynamic-language semantics so that a coerced
//! value can be compared against the raw one:
//!
//! - [`to_string`]: scalars render as text, arrays join their rendered
//!   elements with `,` (null elements render empty), objects render as
//!   `[object Object]`.
//! - [`to_number`]: strings are trimmed and parsed (empty is `0`), booleans
//!   become `0`/`1`, null becomes `0`, arrays go through [`to_string`].
//!   Results that are not finite have no JSON representation and come back
//!   as `Value::Null`.
//! - [`to_boolean`]: truthiness. `null`, `false`, `0`, and `""` are false.
//!
//! A raw value already of the target kind is returned unchanged, so integer
//! representations survive coercion.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::kind::Kind;

/// Primitive target of a field, each with its own coercion function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    /// Validated as a well-formed date instead of by kind.
    Date,
    /// Accepts any value unchanged.
    Any,
}

impl Primitive {
    /// Apply this primitive's coercion function.
    ///
    /// `Date` and `Any` return the raw value; date validation lives in
    /// [`crate::Date::from_value`].
    pub fn coerce(&self, raw: &Value) -> Value {
        match self {
            Self::String => Value::String(to_string(raw)),
            Self::Number => to_number(raw),
            Self::Boolean => Value::Bool(to_boolean(raw)),
            Self::Date | Self::Any => raw.clone(),
        }
    }

    /// The kind a coerced value of this primitive has, when fixed.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::String => Some(Kind::String),
            Self::Number => Some(Kind::Number),
            Self::Boolean => Some(Kind::Boolean),
            Self::Date | Self::Any => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Any => "any",
        }
    }
}

/// Render a value as text.
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Convert a value to a JSON number, or `Value::Null` when the result is
/// not a finite number.
pub fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::Null => Value::from(0),
        Value::Bool(b) => Value::from(u8::from(*b)),
        Value::String(s) => parse_number(s),
        Value::Array(_) => parse_number(&to_string(value)),
        Value::Object(_) => Value::Null,
    }
}

/// Truthiness of a value.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Coercing equality.
///
/// Same-kind values compare directly (numbers by `f64` value, arrays and
/// objects structurally). `null` equals only `null`. Booleans compare as
/// `0`/`1`, strings compared with numbers are parsed, and arrays or objects
/// compared with a scalar are first rendered with [`to_string`].
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a == b,
        (Value::Bool(_), _) => loose_eq(&to_number(a), b),
        (_, Value::Bool(_)) => loose_eq(a, &to_number(b)),
        (Value::Number(_), Value::String(_)) => loose_eq(a, &to_number(b)),
        (Value::String(_), Value::Number(_)) => loose_eq(&to_number(a), b),
        (Value::Array(_) | Value::Object(_), _) => loose_eq(&Value::String(to_string(a)), b),
        (_, Value::Array(_) | Value::Object(_)) => loose_eq(a, &Value::String(to_string(b))),
    }
}

fn parse_number(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::from(0);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_coercion_renders_scalars() {
        assert_eq!(to_string(&json!(12345)), "12345");
        assert_eq!(to_string(&json!(1.5)), "1.5");
        assert_eq!(to_string(&json!(true)), "true");
        assert_eq!(to_string(&json!(null)), "null");
        assert_eq!(to_string(&json!("Moby Dick")), "Moby Dick");
    }

    #[test]
    fn test_string_coercion_renders_containers() {
        assert_eq!(to_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_string(&json!({"x": 1})), "[object Object]");
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(to_number(&json!(" 42 ")), json!(42));
        assert_eq!(to_number(&json!("")), json!(0));
        assert_eq!(to_number(&json!("2.5")), json!(2.5));
        assert_eq!(to_number(&json!("abc")), Value::Null);
        assert_eq!(to_number(&json!(true)), json!(1));
        assert_eq!(to_number(&json!(null)), json!(0));
        assert_eq!(to_number(&json!([7])), json!(7));
        assert_eq!(to_number(&json!({})), Value::Null);
    }

    #[test]
    fn test_number_coercion_preserves_raw_numbers() {
        let raw = json!(13);
        assert_eq!(to_number(&raw), raw);
        assert!(to_number(&raw).is_i64());
    }

    #[test]
    fn test_boolean_coercion() {
        assert!(!to_boolean(&json!(null)));
        assert!(!to_boolean(&json!(0)));
        assert!(!to_boolean(&json!("")));
        assert!(to_boolean(&json!("false")));
        assert!(to_boolean(&json!([])));
        assert!(to_boolean(&json!(-1)));
    }

    #[test]
    fn test_primitive_coerce_changes_kind_for_mismatches() {
        let raw = json!(12345);
        let coerced = Primitive::String.coerce(&raw);
        assert_ne!(Kind::of(&coerced), Kind::of(&raw));

        let raw = json!("a");
        let coerced = Primitive::Number.coerce(&raw);
        assert_ne!(Kind::of(&coerced), Kind::of(&raw));
    }

    #[test]
    fn test_primitive_kinds() {
        assert_eq!(Primitive::String.kind(), Some(Kind::String));
        assert_eq!(Primitive::Date.kind(), None);
        assert_eq!(Primitive::Any.kind(), None);
    }

    #[test]
    fn test_loose_eq_same_kind() {
        assert!(loose_eq(&json!(10), &json!(10.0)));
        assert!(loose_eq(&json!("a"), &json!("a")));
        assert!(!loose_eq(&json!(10), &json!(11)));
        assert!(loose_eq(&json!({"a": [1]}), &json!({"a": [1]})));
    }

    #[test]
    fn test_loose_eq_across_kinds() {
        assert!(loose_eq(&json!(10), &json!("10")));
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!("1"), &json!(true)));
        assert!(loose_eq(&json!([5]), &json!(5)));
        assert!(!loose_eq(&json!(null), &json!(0)));
        assert!(!loose_eq(&json!(""), &json!(null)));
    }
}
