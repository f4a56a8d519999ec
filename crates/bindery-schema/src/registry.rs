//! # Schema Registry
//!
//! Process-wide store of compiled contract sets, keyed by target type.
//!
//! ## Lifecycle
//!
//! A type's contracts are compiled the first time it is registered, either
//! explicitly through [`SchemaRegistry::register`] or implicitly by the
//! first bind. Configuration errors surface at that point. Compiled
//! schemas are immutable and never removed.
//!
//! ## Thread Safety
//!
//! Compilation runs under the registry's write lock, so concurrent first
//! uses of a type declare its contracts exactly once. Binding only takes
//! the read lock long enough to clone the schema's `Arc`, then writes into
//! a freshly allocated instance, so concurrent binds do not contend.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use bindery_core::{yaml_to_json_value, BindError, ContractError, Kind};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::binder::CompiledSchema;
use crate::config::RegistryConfig;
use crate::contract::Presence;
use crate::declare::Contracts;
use crate::field::FieldType;

/// A target type populated by the binder.
///
/// `declare` is the registration step: it attaches contracts to fields and
/// runs once per registry. Fields never declared are never read and keep
/// their `Default` value.
pub trait Schema: Default + Send + Sync + 'static {
    fn declare(contracts: &mut Contracts<Self>);

    /// Name used in error messages. Defaults to the unqualified type name.
    fn schema_name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Bind a JSON value through the global registry.
    fn from_json(value: &Value) -> Result<Self, BindError> {
        SchemaRegistry::global().bind(value)
    }

    /// Bind an input map through the global registry.
    fn from_map(map: &Map<String, Value>) -> Result<Self, BindError> {
        SchemaRegistry::global().bind_map(map)
    }
}

/// Field of a [`SchemaDescription`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescription {
    pub name: String,
    pub source_key: String,
    pub presence: Presence,
    pub field_type: FieldType,
    pub passthrough: bool,
    pub union: Option<Vec<Value>>,
    /// Validator chain in execution order.
    pub checks: Vec<String>,
}

/// Declared contracts of a schema type, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescription {
    pub type_name: String,
    pub fields: Vec<FieldDescription>,
}

/// Store of compiled schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    config: RegistryConfig,
    schemas: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaRegistry {
    /// An empty lenient registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide lenient registry used by [`Schema::from_json`].
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of compiled schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Compile `T`'s contracts if needed and return them.
    ///
    /// # Errors
    ///
    /// Returns the first `ContractError` recorded while `T::declare` ran.
    /// Failed compilations are not cached.
    pub fn register<T: Schema>(&self) -> Result<Arc<CompiledSchema<T>>, ContractError> {
        if let Some(schema) = self.lookup::<T>() {
            return Ok(schema);
        }

        let mut schemas = self.schemas.write();
        if let Some(schema) = schemas
            .get(&TypeId::of::<T>())
            .and_then(|s| Arc::clone(s).downcast::<CompiledSchema<T>>().ok())
        {
            return Ok(schema);
        }

        let mut contracts = Contracts::<T>::new(self.config.strictness);
        T::declare(&mut contracts);
        let compiled = Arc::new(contracts.finish()?);
        schemas.insert(TypeId::of::<T>(), compiled.clone());

        debug!(
            schema = compiled.type_name(),
            fields = compiled.field_names().len(),
            "schema registered"
        );
        Ok(compiled)
    }

    fn lookup<T: Schema>(&self) -> Option<Arc<CompiledSchema<T>>> {
        let schemas = self.schemas.read();
        let schema = schemas.get(&TypeId::of::<T>())?;
        Arc::clone(schema).downcast::<CompiledSchema<T>>().ok()
    }

    /// Bind a JSON value, which must be an object, into a new `T`.
    pub fn bind<T: Schema>(&self, input: &Value) -> Result<T, BindError> {
        let result = match input {
            Value::Object(map) => self.bind_map(map),
            other => Err(BindError::InvalidInput {
                type_name: T::schema_name().to_string(),
                reason: format!("expected an object, found {}", Kind::of(other)),
            }),
        };
        if let Err(err) = &result {
            debug!(schema = T::schema_name(), error = %err, "bind failed");
        }
        result
    }

    /// Bind an input map into a new `T`.
    pub fn bind_map<T: Schema>(&self, input: &Map<String, Value>) -> Result<T, BindError> {
        self.register::<T>()?.bind(input, self)
    }

    /// Bind a parsed YAML document into a new `T`.
    pub fn bind_yaml<T: Schema>(&self, input: &serde_yaml::Value) -> Result<T, BindError> {
        let value = yaml_to_json_value(input).map_err(|e| BindError::InvalidInput {
            type_name: T::schema_name().to_string(),
            reason: e.to_string(),
        })?;
        self.bind(&value)
    }

    /// Describe `T`'s compiled contracts.
    pub fn describe<T: Schema>(&self) -> Result<SchemaDescription, ContractError> {
        Ok(self.register::<T>()?.describe())
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
