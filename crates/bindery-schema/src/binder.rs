//! # Binder
//!
//! Applies a compiled contract set to one input map. Fields are processed
//! strictly in declaration order; for each field:
//!
//! 1. Read the source key (the rename if declared, else the field name).
//! 2. If absent, substitute the default; if still absent, fail when the
//!    field is required, otherwise leave it unset.
//! 3. Coerce to the field's type. Passthrough fields take the raw value.
//! 4. Check union membership of the coerced value.
//! 5. Run the custom transform, which may replace the value and may write
//!    fields declared earlier.
//! 6. Run comparisons and custom predicates in declaration order.
//! 7. Run the integer check.
//! 8. Commit.
//!
//! Passthrough fields skip steps 4, 6 and 7. The first failure aborts the
//! bind and the partially built instance is dropped.
//!
//! ## Transform Ordering
//!
//! A custom transform receives the instance under construction. Only
//! fields declared before the transformed field have been bound at that
//! point; later fields still hold their `Default` value. Transforms must
//! only read or write earlier fields.

use std::any::Any;

use bindery_core::{loose_eq, BindError, BoxError, FieldSite};
use serde_json::{Map, Value};
use tracing::trace;

use crate::contract::FieldContract;
use crate::field::{BindContext, FieldValue};
use crate::registry::{FieldDescription, Schema, SchemaDescription, SchemaRegistry};
use crate::validators::{check_integer, Comparison};

pub(crate) type Transform<T, V> = Box<dyn Fn(&mut T, &str, &V) -> Option<V> + Send + Sync>;
pub(crate) type Predicate<T, V> = Box<dyn Fn(&T, &str, &V) -> Result<(), BoxError> + Send + Sync>;

/// One entry of a field's ordered validator chain.
pub(crate) enum Check<T, V> {
    Compare(Comparison),
    Predicate(Predicate<T, V>),
}

impl<T, V> Check<T, V> {
    fn describe(&self) -> String {
        match self {
            Self::Compare(c) => c.to_string(),
            Self::Predicate(_) => "validate".to_string(),
        }
    }
}

/// Type-erased binding of one declared entry of `T`.
pub(crate) trait FieldBinding<T>: Send + Sync + 'static {
    fn contract(&self) -> &FieldContract;

    fn describe_checks(&self) -> Vec<String>;

    fn bind(
        &self,
        instance: &mut T,
        input: &Map<String, Value>,
        registry: &SchemaRegistry,
        type_name: &str,
    ) -> Result<(), BindError>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) struct TypedField<T, V> {
    pub(crate) contract: FieldContract,
    pub(crate) slot: fn(&mut T) -> &mut Option<V>,
    pub(crate) checks: Vec<Check<T, V>>,
    pub(crate) transform: Option<Transform<T, V>>,
}

impl<T, V: FieldValue> TypedField<T, V> {
    pub(crate) fn new(name: &str, slot: fn(&mut T) -> &mut Option<V>) -> Self {
        Self {
            contract: FieldContract::new(name, V::field_type()),
            slot,
            checks: Vec::new(),
            transform: None,
        }
    }
}

impl<T: Schema, V: FieldValue> FieldBinding<T> for TypedField<T, V> {
    fn contract(&self) -> &FieldContract {
        &self.contract
    }

    fn describe_checks(&self) -> Vec<String> {
        let mut checks: Vec<String> = self.checks.iter().map(Check::describe).collect();
        if self.contract.integer {
            checks.push("integer".to_string());
        }
        checks
    }

    fn bind(
        &self,
        instance: &mut T,
        input: &Map<String, Value>,
        registry: &SchemaRegistry,
        type_name: &str,
    ) -> Result<(), BindError> {
        let contract = &self.contract;
        let site = FieldSite::new(type_name, &contract.name);

        let raw = match input
            .get(contract.source_key())
            .or_else(|| contract.default_value())
        {
            Some(raw) => raw,
            None if contract.is_required() => return Err(site.missing()),
            None => return Ok(()),
        };

        let mut value = V::coerce(raw, &BindContext::new(registry, site))?;

        if !contract.passthrough {
            if let Some(allowed) = &contract.union {
                let probe = value.probe();
                if !allowed.iter().any(|candidate| loose_eq(candidate, &probe)) {
                    return Err(site.not_in_union(allowed, probe));
                }
            }
        }

        if let Some(transform) = &self.transform {
            if let Some(replaced) = transform(instance, &contract.name, &value) {
                value = replaced;
            }
        }

        if !contract.passthrough {
            for check in &self.checks {
                match check {
                    Check::Compare(comparison) => comparison.check(&value.probe(), &site)?,
                    Check::Predicate(predicate) => predicate(instance, &contract.name, &value)
                        .map_err(|e| site.custom(e))?,
                }
            }
            if contract.integer {
                check_integer(&value.probe(), &site)?;
            }
        }

        trace!(schema = type_name, field = %contract.name, "field bound");
        *(self.slot)(instance) = Some(value);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An embedded base schema bound from the same input map.
pub(crate) struct FlattenField<T, B> {
    pub(crate) contract: FieldContract,
    pub(crate) slot: fn(&mut T) -> &mut B,
}

impl<T: Schema, B: Schema> FieldBinding<T> for FlattenField<T, B> {
    fn contract(&self) -> &FieldContract {
        &self.contract
    }

    fn describe_checks(&self) -> Vec<String> {
        vec!["flatten".to_string()]
    }

    fn bind(
        &self,
        instance: &mut T,
        input: &Map<String, Value>,
        registry: &SchemaRegistry,
        _type_name: &str,
    ) -> Result<(), BindError> {
        *(self.slot)(instance) = registry.bind_map::<B>(input)?;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The compiled, immutable contract set of one schema type.
pub struct CompiledSchema<T> {
    type_name: &'static str,
    fields: Vec<Box<dyn FieldBinding<T>>>,
}

impl<T: Schema> CompiledSchema<T> {
    pub(crate) fn new(type_name: &'static str, fields: Vec<Box<dyn FieldBinding<T>>>) -> Self {
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared entries in binding order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.contract().name.as_str()).collect()
    }

    /// Bind `input` into a fresh instance.
    pub fn bind(&self, input: &Map<String, Value>, registry: &SchemaRegistry) -> Result<T, BindError> {
        let mut instance = T::default();
        for field in &self.fields {
            field.bind(&mut instance, input, registry, self.type_name)?;
        }
        Ok(instance)
    }

    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            type_name: self.type_name.to_string(),
            fields: self
                .fields
                .iter()
                .map(|f| {
                    let c = f.contract();
                    FieldDescription {
                        name: c.name.clone(),
                        source_key: c.source_key().to_string(),
                        presence: c.effective_presence(),
                        field_type: c.field_type.clone(),
                        passthrough: c.passthrough,
                        union: c.union.clone(),
                        checks: f.describe_checks(),
                    }
                })
                .collect(),
        }
    }
}

impl<T> std::fmt::Debug for CompiledSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.len())
            .finish()
    }
}
