//! # bindery-core — Value Vocabulary for the Schema Binder
//!
//! This crate defines everything the binder needs to know about an untyped
//! JSON value tree before any schema is involved. It depends on nothing
//! internal; `bindery-schema` builds the contract registry and binder on
//! top of it.
//!
//! ## Contents
//!
//! 1. **Kind classification.** [`Kind`] names the six primitive kinds of a
//!    `serde_json::Value`. Every structural check in the binder compares
//!    kinds, never Rust types.
//!
//! 2. **Primitive coercion.** [`coerce`] holds the string/number/boolean
//!    conversion functions and the coercing [`loose_eq`] used by equality
//!    validators and union membership.
//!
//! 3. **Dates.** [`Date`] is a UTC instant with millisecond precision. It is
//!    the one primitive that is validated for well-formedness instead of by
//!    kind.
//!
//! 4. **YAML input.** [`yaml_to_json_value`] converts a parsed YAML tree so
//!    YAML documents bind exactly like JSON ones.
//!
//! 5. **Errors.** [`BindError`] is the complete runtime taxonomy and
//!    [`ContractError`] the declaration-time one. Both carry the type and
//!    field they originate from.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bindery-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod coerce;
pub mod error;
pub mod kind;
pub mod temporal;
pub mod yaml;

pub use coerce::{loose_eq, to_boolean, to_number, to_string, Primitive};
pub use error::{BindError, BoxError, ContractError, FieldSite};
pub use kind::Kind;
pub use temporal::{Date, DateError};
pub use yaml::{yaml_to_json_value, YamlError};
