//! # Validator Primitives
//!
//! Stateless comparison predicates that close over their bound at
//! declaration time. `gt`/`gte`/`lt`/`lte` are numeric: they first require
//! the value to be a number and fail with `NotNumeric` otherwise. `eq`/`ne`
//! use coercing equality, the same value semantics as union membership.

use std::fmt;

use bindery_core::{loose_eq, BindError, FieldSite, Kind};
use serde_json::Value;

/// A bound comparison against a field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    GreaterThan(f64),
    GreaterOrEqual(f64),
    LessThan(f64),
    LessOrEqual(f64),
    Equal(Value),
    NotEqual(Value),
}

impl Comparison {
    pub fn greater_than(bound: impl Into<f64>) -> Self {
        Self::GreaterThan(bound.into())
    }

    pub fn greater_or_equal(bound: impl Into<f64>) -> Self {
        Self::GreaterOrEqual(bound.into())
    }

    pub fn less_than(bound: impl Into<f64>) -> Self {
        Self::LessThan(bound.into())
    }

    pub fn less_or_equal(bound: impl Into<f64>) -> Self {
        Self::LessOrEqual(bound.into())
    }

    pub fn equal(bound: impl Into<Value>) -> Self {
        Self::Equal(bound.into())
    }

    pub fn not_equal(bound: impl Into<Value>) -> Self {
        Self::NotEqual(bound.into())
    }

    /// Check `value` against this comparison.
    pub fn check(&self, value: &Value, site: &FieldSite<'_>) -> Result<(), BindError> {
        let holds = match self {
            Self::Equal(bound) => loose_eq(value, bound),
            Self::NotEqual(bound) => !loose_eq(value, bound),
            numeric => {
                let actual = require_number(value, self, site)?;
                match *numeric {
                    Self::GreaterThan(bound) => actual > bound,
                    Self::GreaterOrEqual(bound) => actual >= bound,
                    Self::LessThan(bound) => actual < bound,
                    Self::LessOrEqual(bound) => actual <= bound,
                    Self::Equal(_) | Self::NotEqual(_) => true,
                }
            }
        };
        if holds {
            Ok(())
        } else {
            Err(site.comparison_failed(self, value.clone()))
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GreaterThan(b) => write!(f, "> {b}"),
            Self::GreaterOrEqual(b) => write!(f, ">= {b}"),
            Self::LessThan(b) => write!(f, "< {b}"),
            Self::LessOrEqual(b) => write!(f, "<= {b}"),
            Self::Equal(b) => write!(f, "== {b}"),
            Self::NotEqual(b) => write!(f, "!= {b}"),
        }
    }
}

/// Require `value` to be a whole number.
pub fn check_integer(value: &Value, site: &FieldSite<'_>) -> Result<(), BindError> {
    let actual = require_number(value, "integer", site)?;
    if actual.floor() == actual {
        Ok(())
    } else {
        Err(site.not_integer(actual))
    }
}

fn require_number(
    value: &Value,
    requirement: impl fmt::Display,
    site: &FieldSite<'_>,
) -> Result<f64, BindError> {
    match value.as_f64() {
        Some(n) => Ok(n),
        None => Err(site.not_numeric(requirement, Kind::of(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SITE: FieldSite<'static> = FieldSite {
        type_name: "Person",
        field: "id",
    };

    #[test]
    fn test_numeric_bounds() {
        assert!(Comparison::greater_than(5).check(&json!(6), &SITE).is_ok());
        assert!(Comparison::greater_than(5).check(&json!(5), &SITE).is_err());
        assert!(Comparison::greater_or_equal(5).check(&json!(5), &SITE).is_ok());
        assert!(Comparison::less_than(10).check(&json!(10), &SITE).is_err());
        assert!(Comparison::less_or_equal(5).check(&json!(5), &SITE).is_ok());
        assert!(Comparison::less_or_equal(5).check(&json!(6), &SITE).is_err());
    }

    #[test]
    fn test_numeric_bound_rejects_non_numbers() {
        let err = Comparison::greater_than(5).check(&json!("7"), &SITE).unwrap_err();
        assert!(matches!(
            err,
            BindError::NotNumeric {
                actual: Kind::String,
                ..
            }
        ));
    }

    #[test]
    fn test_failure_names_bound_and_value() {
        let err = Comparison::less_than(10).check(&json!(12), &SITE).unwrap_err();
        match err {
            BindError::ComparisonFailed {
                requirement,
                actual,
                ..
            } => {
                assert_eq!(requirement, "< 10");
                assert_eq!(actual, json!(12));
            }
            other => panic!("Expected ComparisonFailed, got: {other}"),
        }
    }

    #[test]
    fn test_equality_is_loose() {
        assert!(Comparison::equal(10).check(&json!(10), &SITE).is_ok());
        assert!(Comparison::equal(10).check(&json!("10"), &SITE).is_ok());
        assert!(Comparison::equal(10).check(&json!(11), &SITE).is_err());
        assert!(Comparison::not_equal(6).check(&json!(6.0), &SITE).is_err());
        assert!(Comparison::not_equal("Canine").check(&json!("Feline"), &SITE).is_ok());
    }

    #[test]
    fn test_equality_does_not_require_numbers() {
        assert!(Comparison::equal("x").check(&json!("x"), &SITE).is_ok());
    }

    #[test]
    fn test_integer_check() {
        assert!(check_integer(&json!(13), &SITE).is_ok());
        assert!(check_integer(&json!(-2.0), &SITE).is_ok());
        assert!(matches!(
            check_integer(&json!(13.4), &SITE),
            Err(BindError::NotInteger { .. })
        ));
        assert!(matches!(
            check_integer(&json!(true), &SITE),
            Err(BindError::NotNumeric { .. })
        ));
    }
}
