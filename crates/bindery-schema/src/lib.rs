//! # bindery-schema — Declarative Field Contracts and the Binder
//!
//! Converts an untyped `serde_json::Value` tree into a strongly-typed
//! struct, enforcing per-field contracts declared once on the target type.
//!
//! ## Declaring Contracts (`declare`, `registry`)
//!
//! A target type implements [`Schema`] and lists its fields in
//! [`Schema::declare`]. Each field names its slot (an `Option<V>` on the
//! struct) and attaches contract fragments: requiredness, default, rename,
//! union set, comparisons, integer flag, custom predicates, a custom
//! transform, or passthrough. Declaration order is binding order.
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Book {
//!     name: Option<String>,
//!     author: Option<Author>,
//! }
//!
//! impl Schema for Book {
//!     fn declare(c: &mut Contracts<Self>) {
//!         c.field("name", |b| &mut b.name).map("title").required();
//!         c.field("author", |b| &mut b.author).required();
//!     }
//! }
//!
//! let book = Book::from_json(&json!({"title": "Moby Dick", "author": {"name": "Herman Melville"}}))?;
//! ```
//!
//! ## Binding (`binder`)
//!
//! [`SchemaRegistry::bind`] compiles the type's contracts on first use and
//! runs the field pipeline: resolve key, default or require, coerce with a
//! kind check, union, transform, comparisons, integer check, commit. The
//! first failure aborts with a [`BindError`] naming the type and field.
//!
//! ## Crate Policy
//!
//! - Depends only on `bindery-core` internally.
//! - No runtime reflection: field shapes are resolved from Rust types when
//!   contracts are declared.
//! - No `unwrap()` outside tests.

pub mod binder;
pub mod config;
pub mod contract;
pub mod declare;
pub mod field;
pub mod registry;
pub mod validators;

pub use bindery_core::{BindError, ContractError, Date, Kind};
pub use binder::CompiledSchema;
pub use config::{RegistryConfig, Strictness};
pub use contract::{FieldContract, Presence};
pub use declare::{Contracts, FieldBuilder};
pub use field::{BindContext, FieldType, FieldValue};
pub use registry::{FieldDescription, Schema, SchemaDescription, SchemaRegistry};
pub use validators::Comparison;
