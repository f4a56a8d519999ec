//! # Field Values — Typed Coercion Targets
//!
//! [`FieldValue`] is implemented by every Rust type a declared field can
//! hold. Each implementation reports its [`FieldType`] tag once, at
//! declaration, and coerces raw input values at bind time.
//!
//! ## Coercion
//!
//! Primitive targets run the primitive's coercion function from
//! `bindery-core` and then require the coerced value to have the same
//! [`Kind`] as the raw one, so `12345` never silently becomes `"12345"`.
//! Dates are validated for well-formedness instead. Nested schema types
//! recurse into the registry. `Vec<E>` coerces each element as `E`,
//! reporting element failures as `field[index]`.
//!
//! ## Probes
//!
//! Union membership and comparison validators look at a field through
//! [`FieldValue::probe`], a JSON rendering of the coerced value. Dates
//! probe as epoch milliseconds. Nested schema instances probe as an empty
//! object.

use std::fmt;

use bindery_core::{BindError, Date, FieldSite, Kind, Primitive};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::registry::{Schema, SchemaRegistry};

/// Shape of a declared field, resolved once from its Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum FieldType {
    /// A primitive with its coercion function.
    Primitive(Primitive),
    /// A nested schema type, by name.
    Object(&'static str),
    /// A sequence of elements of the inner type.
    Array(Box<FieldType>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.as_str()),
            Self::Object(name) => f.write_str(name),
            Self::Array(inner) => write!(f, "array<{inner}>"),
        }
    }
}

/// What a coercion needs besides the raw value: the registry for nested
/// schemas and the site to attach to errors.
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    registry: &'a SchemaRegistry,
    site: FieldSite<'a>,
}

impl<'a> BindContext<'a> {
    pub fn new(registry: &'a SchemaRegistry, site: FieldSite<'a>) -> Self {
        Self { registry, site }
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    pub fn site(&self) -> &FieldSite<'a> {
        &self.site
    }

    /// Context for an element of this field, reported under `field`.
    pub fn element<'b>(&self, field: &'b str) -> BindContext<'b>
    where
        'a: 'b,
    {
        BindContext {
            registry: self.registry,
            site: FieldSite::new(self.site.type_name, field),
        }
    }
}

/// A Rust type that a declared field can hold.
pub trait FieldValue: Sized + Send + Sync + 'static {
    /// The field's shape.
    fn field_type() -> FieldType;

    /// Coerce a raw input value into this type.
    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError>;

    /// JSON view used by union and comparison checks.
    fn probe(&self) -> Value;
}

/// Run a primitive coercion function and require the result to keep the
/// raw value's kind.
fn coerce_primitive(
    primitive: Primitive,
    raw: &Value,
    cx: &BindContext<'_>,
) -> Result<Value, BindError> {
    let coerced = primitive.coerce(raw);
    let actual = Kind::of(raw);
    if Kind::of(&coerced) != actual {
        let expected = primitive.kind().unwrap_or(actual);
        return Err(cx.site().type_mismatch(expected, actual));
    }
    Ok(coerced)
}

fn coerce_number(raw: &Value, cx: &BindContext<'_>) -> Result<Number, BindError> {
    match coerce_primitive(Primitive::Number, raw, cx)? {
        Value::Number(n) => Ok(n),
        other => Err(cx.site().type_mismatch(Kind::Number, Kind::of(&other))),
    }
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::Primitive(Primitive::String)
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        match coerce_primitive(Primitive::String, raw, cx)? {
            Value::String(s) => Ok(s),
            other => Err(cx.site().type_mismatch(Kind::String, Kind::of(&other))),
        }
    }

    fn probe(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Primitive(Primitive::Boolean)
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        match coerce_primitive(Primitive::Boolean, raw, cx)? {
            Value::Bool(b) => Ok(b),
            other => Err(cx.site().type_mismatch(Kind::Boolean, Kind::of(&other))),
        }
    }

    fn probe(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::Primitive(Primitive::Number)
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        let n = coerce_number(raw, cx)?;
        n.as_f64()
            .ok_or_else(|| cx.site().type_mismatch(Kind::Number, Kind::of(raw)))
    }

    fn probe(&self) -> Value {
        Number::from_f64(*self).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::Primitive(Primitive::Number)
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        let wide = f64::coerce(raw, cx)?;
        let narrow = wide as f32;
        if narrow.is_finite() {
            Ok(narrow)
        } else {
            Err(cx.site().out_of_range(wide, "f32"))
        }
    }

    fn probe(&self) -> Value {
        // Widening 0.1f32 gives 0.10000000149011612; the shortest decimal
        // form is what the input said.
        self.to_string()
            .parse::<f64>()
            .map_or(Value::Null, |wide| wide.probe())
    }
}

macro_rules! integral_field_value {
    ($($ty:ty),* $(,)?) => {$(
        impl FieldValue for $ty {
            fn field_type() -> FieldType {
                FieldType::Primitive(Primitive::Number)
            }

            fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
                let n = coerce_number(raw, cx)?;
                let target = stringify!($ty);
                if let Some(i) = n.as_i64() {
                    return <$ty>::try_from(i).map_err(|_| cx.site().out_of_range(i as f64, target));
                }
                if let Some(u) = n.as_u64() {
                    return <$ty>::try_from(u).map_err(|_| cx.site().out_of_range(u as f64, target));
                }
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() != 0.0 {
                    return Err(cx.site().not_integer(f));
                }
                // `<$ty>::MAX as f64` rounds up for 64-bit targets, so compare
                // in i128 where every such whole float is exact.
                <$ty>::try_from(f as i128).map_err(|_| cx.site().out_of_range(f, target))
            }

            fn probe(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

integral_field_value!(i64, i32, u64, u32);

impl FieldValue for Date {
    fn field_type() -> FieldType {
        FieldType::Primitive(Primitive::Date)
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        Date::from_value(raw).map_err(|e| cx.site().invalid_date(raw, e))
    }

    fn probe(&self) -> Value {
        Value::from(self.epoch_millis())
    }
}

impl FieldValue for Value {
    fn field_type() -> FieldType {
        FieldType::Primitive(Primitive::Any)
    }

    fn coerce(raw: &Value, _cx: &BindContext<'_>) -> Result<Self, BindError> {
        Ok(raw.clone())
    }

    fn probe(&self) -> Value {
        self.clone()
    }
}

impl<E: FieldValue> FieldValue for Vec<E> {
    fn field_type() -> FieldType {
        FieldType::Array(Box::new(E::field_type()))
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        let Value::Array(items) = raw else {
            return Err(cx.site().type_mismatch(Kind::Array, Kind::of(raw)));
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let name = format!("{}[{index}]", cx.site().field);
            out.push(E::coerce(item, &cx.element(&name))?);
        }
        Ok(out)
    }

    fn probe(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::probe).collect())
    }
}

impl<S: Schema> FieldValue for S {
    fn field_type() -> FieldType {
        FieldType::Object(S::schema_name())
    }

    fn coerce(raw: &Value, cx: &BindContext<'_>) -> Result<Self, BindError> {
        match raw {
            Value::Object(map) => cx.registry().bind_map::<S>(map),
            other => Err(cx.site().type_mismatch(Kind::Object, Kind::of(other))),
        }
    }

    fn probe(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }
}
