//! # Contract Declaration
//!
//! [`Contracts`] is the registration surface a [`Schema`] type fills in
//! its `declare` function. Each call to [`Contracts::field`] names a field
//! and the accessor for its slot, and returns a [`FieldBuilder`] to attach
//! contract fragments:
//!
//! ```rust,ignore
//! impl Schema for Person {
//!     fn declare(c: &mut Contracts<Self>) {
//!         c.field("specie", |p| &mut p.specie).required();
//!         c.field("id", |p| &mut p.id).gt(5).lt(10).ne(6);
//!         c.field("name", |p| &mut p.name).map("title");
//!     }
//! }
//! ```
//!
//! ## Merging
//!
//! Declaring a name that is already declared merges into the existing
//! entry; its position in the field order does not change. Fragments
//! accumulate: comparisons and predicates run in the order declared.
//! Redeclaring a name with a different value type is a
//! `ConfigurationConflict`.
//!
//! ## Requiredness
//!
//! Fields with no requiredness fragment are optional. Under
//! [`Strictness::Lenient`] a later requiredness fragment replaces an
//! earlier one. Under [`Strictness::Strict`] a second requiredness fragment
//! on the same field is a `ConfigurationConflict`.
//!
//! Errors are collected during declaration and reported when the schema is
//! registered, before anything is bound.

use std::collections::HashMap;
use std::marker::PhantomData;

use bindery_core::{BoxError, ContractError, FieldSite};
use serde_json::Value;

use crate::binder::{Check, CompiledSchema, FieldBinding, FlattenField, TypedField};
use crate::config::Strictness;
use crate::contract::{FieldContract, Presence};
use crate::field::{FieldType, FieldValue};
use crate::registry::Schema;
use crate::validators::Comparison;

/// Contract set of a schema type under construction.
pub struct Contracts<T> {
    type_name: &'static str,
    strictness: Strictness,
    entries: Vec<Box<dyn FieldBinding<T>>>,
    index: HashMap<String, usize>,
    errors: Vec<ContractError>,
}

impl<T: Schema> Contracts<T> {
    pub(crate) fn new(strictness: Strictness) -> Self {
        Self {
            type_name: T::schema_name(),
            strictness,
            entries: Vec::new(),
            index: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Declare (or revisit) a field bound into `slot`.
    pub fn field<V: FieldValue>(
        &mut self,
        name: &str,
        slot: fn(&mut T) -> &mut Option<V>,
    ) -> FieldBuilder<'_, T, V> {
        let site = FieldSite::new(self.type_name, name);
        let entry = match self.index.get(name) {
            Some(&i) => {
                let matches = self.entries[i]
                    .as_any_mut()
                    .downcast_mut::<TypedField<T, V>>()
                    .is_some();
                if matches {
                    Some(i)
                } else {
                    let existing = self.entries[i].contract().field_type.clone();
                    self.errors.push(site.conflict(format!(
                        "redeclared as {}, previously declared as {existing}",
                        V::field_type()
                    )));
                    None
                }
            }
            None => {
                if let FieldType::Array(element) = V::field_type() {
                    if matches!(*element, FieldType::Array(_)) {
                        self.errors.push(site.unsupported_nesting(&element));
                    }
                }
                self.entries.push(Box::new(TypedField::new(name, slot)));
                self.index.insert(name.to_string(), self.entries.len() - 1);
                Some(self.entries.len() - 1)
            }
        };
        FieldBuilder {
            contracts: self,
            entry,
            _value: PhantomData,
        }
    }

    /// Declare an array field; each element is coerced as `E`.
    pub fn array<E: FieldValue>(
        &mut self,
        name: &str,
        slot: fn(&mut T) -> &mut Option<Vec<E>>,
    ) -> FieldBuilder<'_, T, Vec<E>> {
        self.field(name, slot)
    }

    /// Embed a base schema: at this position in the field order, `B` is
    /// bound from the same input map into `slot`.
    pub fn flatten<B: Schema>(&mut self, slot: fn(&mut T) -> &mut B) {
        let name = B::schema_name();
        if self.index.contains_key(name) {
            let site = FieldSite::new(self.type_name, name);
            self.errors.push(site.conflict("base schema embedded twice"));
            return;
        }
        let mut contract = FieldContract::new(name, FieldType::Object(name));
        contract.presence = Some(Presence::Required);
        self.entries.push(Box::new(FlattenField { contract, slot }));
        self.index.insert(name.to_string(), self.entries.len() - 1);
    }

    pub(crate) fn finish(self) -> Result<CompiledSchema<T>, ContractError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(CompiledSchema::new(self.type_name, self.entries)),
        }
    }
}

/// Attaches contract fragments to one declared field.
pub struct FieldBuilder<'a, T, V> {
    contracts: &'a mut Contracts<T>,
    /// `None` when the declaration conflicted; fragments are then ignored.
    entry: Option<usize>,
    _value: PhantomData<fn() -> V>,
}

impl<'a, T: Schema, V: FieldValue> FieldBuilder<'a, T, V> {
    fn update(self, f: impl FnOnce(&mut TypedField<T, V>, &mut Vec<ContractError>, Strictness)) -> Self {
        if let Some(i) = self.entry {
            let Contracts {
                entries,
                errors,
                strictness,
                ..
            } = &mut *self.contracts;
            if let Some(field) = entries[i].as_any_mut().downcast_mut::<TypedField<T, V>>() {
                f(field, errors, *strictness);
            }
        }
        self
    }

    fn presence(self, presence: Presence) -> Self {
        let type_name = self.contracts.type_name;
        self.update(|field, errors, strictness| {
            let contract = &mut field.contract;
            if let (Strictness::Strict, Some(existing)) = (strictness, &contract.presence) {
                let site = FieldSite::new(type_name, &contract.name);
                errors.push(site.conflict(format!(
                    "cannot mark as {presence}, already set as {existing}"
                )));
                return;
            }
            contract.presence = Some(presence);
        })
    }

    /// The input must contain the field.
    pub fn required(self) -> Self {
        self.presence(Presence::Required)
    }

    /// The field may be absent and is then left unset.
    pub fn optional(self) -> Self {
        self.presence(Presence::Optional)
    }

    /// The field may be absent and then takes `default`, which goes through
    /// the same coercion and checks as an input value.
    pub fn optional_or(self, default: impl Into<Value>) -> Self {
        self.presence(Presence::OptionalWithDefault(default.into()))
    }

    /// Read the field from `source_key` instead of its own name.
    pub fn map(self, source_key: impl Into<String>) -> Self {
        let key = source_key.into();
        self.update(|field, _, _| field.contract.source_key = Some(key))
    }

    /// Restrict the coerced value to a closed set.
    pub fn union<I, X>(self, values: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.update(|field, _, _| field.contract.union = Some(values))
    }

    /// Require a whole number.
    pub fn integer(self) -> Self {
        self.update(|field, _, _| field.contract.integer = true)
    }

    /// Append a custom predicate to the validator chain.
    pub fn validate<F, E>(self, predicate: F) -> Self
    where
        F: Fn(&T, &str, &V) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.update(|field, _, _| {
            field.checks.push(Check::Predicate(Box::new(
                move |instance: &T, key: &str, value: &V| {
                    predicate(instance, key, value).map_err(Into::into)
                },
            )))
        })
    }

    /// Install the custom transform. A returned value replaces the coerced
    /// one; `None` keeps it. The transform may write fields declared before
    /// this one on the instance.
    pub fn custom<F>(self, transform: F) -> Self
    where
        F: Fn(&mut T, &str, &V) -> Option<V> + Send + Sync + 'static,
    {
        self.update(|field, _, _| field.transform = Some(Box::new(transform)))
    }

    fn compare(self, comparison: Comparison) -> Self {
        self.update(|field, _, _| field.checks.push(Check::Compare(comparison)))
    }

    pub fn gt(self, bound: impl Into<f64>) -> Self {
        self.compare(Comparison::greater_than(bound))
    }

    pub fn gte(self, bound: impl Into<f64>) -> Self {
        self.compare(Comparison::greater_or_equal(bound))
    }

    pub fn lt(self, bound: impl Into<f64>) -> Self {
        self.compare(Comparison::less_than(bound))
    }

    pub fn lte(self, bound: impl Into<f64>) -> Self {
        self.compare(Comparison::less_or_equal(bound))
    }

    pub fn eq(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::equal(bound))
    }

    pub fn ne(self, bound: impl Into<Value>) -> Self {
        self.compare(Comparison::not_equal(bound))
    }
}

impl<'a, T: Schema> FieldBuilder<'a, T, Value> {
    /// Assign the raw input value verbatim, skipping union, comparison and
    /// integer checks. A custom transform still runs.
    pub fn passthrough(self) -> Self {
        self.update(|field, _, _| field.contract.passthrough = true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Person {
        id: Option<f64>,
        name: Option<String>,
        tags: Option<Vec<String>>,
    }

    impl Schema for Person {
        fn declare(_: &mut Contracts<Self>) {}
    }

    #[derive(Debug, Default)]
    struct Wrapper {
        person: Person,
    }

    impl Schema for Wrapper {
        fn declare(_: &mut Contracts<Self>) {}
    }

    fn contracts(strictness: Strictness) -> Contracts<Person> {
        Contracts::new(strictness)
    }

    #[test]
    fn test_redeclaration_keeps_position() {
        let mut c = contracts(Strictness::Lenient);
        c.field("id", |p| &mut p.id).gt(1);
        c.field("name", |p| &mut p.name);
        c.field("id", |p| &mut p.id).required();
        let schema = c.finish().unwrap();
        assert_eq!(schema.field_names(), vec!["id", "name"]);
        let description = schema.describe();
        assert_eq!(description.fields[0].presence, Presence::Required);
    }

    #[test]
    fn test_lenient_last_requiredness_wins() {
        let mut c = contracts(Strictness::Lenient);
        c.field("id", |p| &mut p.id).optional().required();
        let schema = c.finish().unwrap();
        assert_eq!(schema.describe().fields[0].presence, Presence::Required);
    }

    #[test]
    fn test_strict_rejects_second_requiredness() {
        let mut c = contracts(Strictness::Strict);
        c.field("id", |p| &mut p.id).required();
        c.field("id", |p| &mut p.id).optional_or(3);
        let err = c.finish().unwrap_err();
        assert!(matches!(err, ContractError::ConfigurationConflict { .. }));
    }

    #[test]
    fn test_strict_allows_single_requiredness() {
        let mut c = contracts(Strictness::Strict);
        c.field("id", |p| &mut p.id).required().gt(0);
        c.field("name", |p| &mut p.name).optional();
        assert!(c.finish().is_ok());
    }

    #[test]
    fn test_type_change_conflicts() {
        let mut c = contracts(Strictness::Lenient);
        c.field("id", |p| &mut p.id);
        c.field("id", |p| &mut p.name).required();
        match c.finish().unwrap_err() {
            ContractError::ConfigurationConflict { field, reason, .. } => {
                assert_eq!(field, "id");
                assert_eq!(reason, "redeclared as string, previously declared as number");
            }
            other => panic!("Expected ConfigurationConflict, got: {other}"),
        }
    }

    #[test]
    fn test_array_declares_element_type() {
        let mut c = contracts(Strictness::Lenient);
        c.array("tags", |p| &mut p.tags);
        let description = c.finish().unwrap().describe();
        assert_eq!(description.fields[0].field_type.to_string(), "array<string>");
    }

    #[test]
    fn test_flatten_twice_conflicts() {
        let mut c: Contracts<Wrapper> = Contracts::new(Strictness::Lenient);
        c.flatten(|w| &mut w.person);
        c.flatten(|w| &mut w.person);
        assert!(matches!(
            c.finish(),
            Err(ContractError::ConfigurationConflict { .. })
        ));
    }
}
