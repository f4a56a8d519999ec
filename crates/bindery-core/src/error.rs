//! # Error Types — Binding and Contract Failures
//!
//! Two error enums, split by when they can occur:
//!
//! - [`ContractError`] is raised while a type's contracts are declared and
//!   compiled, before any input is seen.
//! - [`BindError`] is raised while binding one input. Every variant names
//!   the schema type and the field it originates from. Failures inside a
//!   nested object or array element are returned unchanged, so the caller
//!   of the outermost bind sees the innermost context.
//!
//! Binding is fail-fast: the first error aborts the whole bind.

use serde_json::Value;
use thiserror::Error;

use crate::kind::Kind;

/// Boxed error returned by user-supplied validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Declaration-time error in a type's contract set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// Two declarations for the same field cannot both hold.
    #[error("{type_name}.{field}: {reason}")]
    ConfigurationConflict {
        type_name: String,
        field: String,
        reason: String,
    },

    /// An array field whose elements are themselves arrays.
    #[error("{type_name}.{field}: array elements of type {element} are not supported; only one level of element nesting is allowed")]
    UnsupportedNesting {
        type_name: String,
        field: String,
        element: String,
    },
}

/// Runtime failure while binding an input value onto a schema type.
#[derive(Error, Debug)]
pub enum BindError {
    /// Required field absent and no default declared.
    #[error("{type_name}.{field} is required")]
    MissingRequiredField { type_name: String, field: String },

    /// The coerced value's kind differs from the raw value's kind.
    #[error("{type_name}.{field}: expected {expected}, found {actual}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: Kind,
        actual: Kind,
    },

    /// A date-typed field whose value cannot form a well-formed date.
    #[error("{type_name}.{field}: invalid date {value}: {reason}")]
    InvalidDate {
        type_name: String,
        field: String,
        value: Value,
        reason: String,
    },

    /// The coerced value is not in the declared admissible set.
    #[error("{type_name}.{field}: {value} is not one of {}", render_set(.allowed))]
    NotInUnion {
        type_name: String,
        field: String,
        allowed: Vec<Value>,
        value: Value,
    },

    /// A comparison validator rejected the value.
    #[error("{type_name}.{field}: requirement failed: {actual} {requirement}")]
    ComparisonFailed {
        type_name: String,
        field: String,
        /// Operator and bound, e.g. `> 5`.
        requirement: String,
        actual: Value,
    },

    /// A numeric-only validator was applied to a non-numeric value.
    #[error("{type_name}.{field}: {requirement} requires a numeric value, found {actual}")]
    NotNumeric {
        type_name: String,
        field: String,
        requirement: String,
        actual: Kind,
    },

    /// An integer-flagged or integral field holds a fractional number.
    #[error("{type_name}.{field}: {value} must be an integer")]
    NotInteger {
        type_name: String,
        field: String,
        value: f64,
    },

    /// A number does not fit the field's integral type.
    #[error("{type_name}.{field}: {value} is out of range for {target}")]
    OutOfRange {
        type_name: String,
        field: String,
        value: f64,
        target: &'static str,
    },

    /// A user-supplied validator rejected the value.
    #[error("{type_name}.{field}: custom validation failed: {source}")]
    CustomValidationFailed {
        type_name: String,
        field: String,
        #[source]
        source: BoxError,
    },

    /// The input could not be presented as a value tree.
    #[error("invalid input for {type_name}: {reason}")]
    InvalidInput { type_name: String, reason: String },

    /// The type's contract set failed to compile.
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),
}

impl BindError {
    /// Schema type the error originates from, when field-scoped.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { type_name, .. }
            | Self::TypeMismatch { type_name, .. }
            | Self::InvalidDate { type_name, .. }
            | Self::NotInUnion { type_name, .. }
            | Self::ComparisonFailed { type_name, .. }
            | Self::NotNumeric { type_name, .. }
            | Self::NotInteger { type_name, .. }
            | Self::OutOfRange { type_name, .. }
            | Self::CustomValidationFailed { type_name, .. }
            | Self::InvalidInput { type_name, .. } => Some(type_name.as_str()),
            Self::Contract(ContractError::ConfigurationConflict { type_name, .. })
            | Self::Contract(ContractError::UnsupportedNesting { type_name, .. }) => {
                Some(type_name.as_str())
            }
        }
    }

    /// Field the error originates from, when field-scoped.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::NotInUnion { field, .. }
            | Self::ComparisonFailed { field, .. }
            | Self::NotNumeric { field, .. }
            | Self::NotInteger { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::CustomValidationFailed { field, .. } => Some(field.as_str()),
            Self::Contract(ContractError::ConfigurationConflict { field, .. })
            | Self::Contract(ContractError::UnsupportedNesting { field, .. }) => {
                Some(field.as_str())
            }
            Self::InvalidInput { .. } => None,
        }
    }
}

/// The type and field a check runs against. Builds [`BindError`]s with
/// that context attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSite<'a> {
    pub type_name: &'a str,
    pub field: &'a str,
}

impl<'a> FieldSite<'a> {
    pub fn new(type_name: &'a str, field: &'a str) -> Self {
        Self { type_name, field }
    }

    pub fn missing(&self) -> BindError {
        BindError::MissingRequiredField {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
        }
    }

    pub fn type_mismatch(&self, expected: Kind, actual: Kind) -> BindError {
        BindError::TypeMismatch {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            expected,
            actual,
        }
    }

    pub fn invalid_date(&self, value: &Value, reason: impl ToString) -> BindError {
        BindError::InvalidDate {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            value: value.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn not_in_union(&self, allowed: &[Value], value: Value) -> BindError {
        BindError::NotInUnion {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            allowed: allowed.to_vec(),
            value,
        }
    }

    pub fn comparison_failed(&self, requirement: impl ToString, actual: Value) -> BindError {
        BindError::ComparisonFailed {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            requirement: requirement.to_string(),
            actual,
        }
    }

    pub fn not_numeric(&self, requirement: impl ToString, actual: Kind) -> BindError {
        BindError::NotNumeric {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            requirement: requirement.to_string(),
            actual,
        }
    }

    pub fn not_integer(&self, value: f64) -> BindError {
        BindError::NotInteger {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            value,
        }
    }

    pub fn out_of_range(&self, value: f64, target: &'static str) -> BindError {
        BindError::OutOfRange {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            value,
            target,
        }
    }

    pub fn custom(&self, source: BoxError) -> BindError {
        BindError::CustomValidationFailed {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            source,
        }
    }

    pub fn conflict(&self, reason: impl ToString) -> ContractError {
        ContractError::ConfigurationConflict {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported_nesting(&self, element: impl ToString) -> ContractError {
        ContractError::UnsupportedNesting {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            element: element.to_string(),
        }
    }
}

fn render_set(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_required_display() {
        let err = FieldSite::new("Book", "name").missing();
        assert_eq!(err.to_string(), "Book.name is required");
        assert_eq!(err.type_name(), Some("Book"));
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_not_in_union_lists_set_and_value() {
        let site = FieldSite::new("Person", "id");
        let err = site.not_in_union(&[json!(1), json!(2)], json!(6));
        assert_eq!(err.to_string(), "Person.id: 6 is not one of [1, 2]");
    }

    #[test]
    fn test_comparison_failed_names_bound_and_value() {
        let err = FieldSite::new("Person", "id").comparison_failed("> 5", json!(5));
        let msg = err.to_string();
        assert!(msg.contains("> 5"), "{msg}");
        assert!(msg.contains("requirement failed: 5"), "{msg}");
    }

    #[test]
    fn test_type_mismatch_names_kinds() {
        let err = FieldSite::new("Book", "name").type_mismatch(Kind::String, Kind::Number);
        assert_eq!(err.to_string(), "Book.name: expected string, found number");
    }

    #[test]
    fn test_custom_keeps_source() {
        use std::error::Error as _;
        let err = FieldSite::new("Person", "id").custom("too small".into());
        assert!(err.source().is_some());
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_contract_error_converts() {
        let site = FieldSite::new("Matrix", "rows");
        let err: BindError = site.unsupported_nesting("array").into();
        assert!(matches!(
            err,
            BindError::Contract(ContractError::UnsupportedNesting { .. })
        ));
        assert_eq!(err.field(), Some("rows"));
    }

    #[test]
    fn test_invalid_input_has_no_field() {
        let err = BindError::InvalidInput {
            type_name: "Book".into(),
            reason: "expected an object".into(),
        };
        assert_eq!(err.type_name(), Some("Book"));
        assert_eq!(err.field(), None);
    }
}
