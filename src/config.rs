//! The validated value-source descriptor built from an aggregation request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field_context::FieldContext;
use crate::script::ScriptDescriptor;

/// The value domain a source operates over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `f64` values.
    Numeric,
    /// Opaque byte sequences (string-like values).
    Bytes,
    /// Geographic coordinates.
    GeoPoint,
    /// Unresolved wildcard domain, treated as bytes-like.
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Numeric => f.write_str("numeric"),
            ValueType::Bytes => f.write_str("bytes"),
            ValueType::GeoPoint => f.write_str("geo_point"),
            ValueType::Any => f.write_str("any"),
        }
    }
}

/// A raw request literal, either already numeric or textual.
///
/// This is the shape of the `missing` parameter as it arrives from a JSON
/// aggregation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `f64` literal.
    F64(f64),
    /// String literal.
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::F64(val) => write!(f, "{val}"),
            Literal::Str(val) => f.write_str(val),
        }
    }
}

impl From<f64> for Literal {
    fn from(val: f64) -> Literal {
        Literal::F64(val)
    }
}

impl From<&str> for Literal {
    fn from(val: &str) -> Literal {
        Literal::Str(val.to_string())
    }
}

impl From<String> for Literal {
    fn from(val: String) -> Literal {
        Literal::Str(val)
    }
}

/// Immutable descriptor of how to obtain per-document values.
///
/// A config is valid iff it carries a field context, a script, or the
/// unmapped marker. Validity is checked by
/// [`resolve`](crate::ExecutionContext::resolve), not at construction.
#[derive(Clone, Debug)]
pub struct ValuesSourceConfig {
    value_type: ValueType,
    field_context: Option<FieldContext>,
    script: Option<ScriptDescriptor>,
    missing: Option<Literal>,
    unmapped: bool,
}

impl ValuesSourceConfig {
    /// An empty config for the given domain. Attach a field context and/or a
    /// script before resolving.
    pub fn new(value_type: ValueType) -> ValuesSourceConfig {
        ValuesSourceConfig {
            value_type,
            field_context: None,
            script: None,
            missing: None,
            unmapped: false,
        }
    }

    /// Config for a field that does not exist in this index's schema.
    pub fn unmapped(value_type: ValueType) -> ValuesSourceConfig {
        ValuesSourceConfig {
            unmapped: true,
            ..ValuesSourceConfig::new(value_type)
        }
    }

    /// Targets an indexed field.
    pub fn set_field_context(mut self, field_context: FieldContext) -> ValuesSourceConfig {
        self.field_context = Some(field_context);
        self
    }

    /// Adds a computed transform, or a computed-only source when no field
    /// context is set.
    pub fn set_script(mut self, script: ScriptDescriptor) -> ValuesSourceConfig {
        self.script = Some(script);
        self
    }

    /// Fallback literal substituted for documents without a stored value.
    pub fn set_missing<L: Into<Literal>>(mut self, missing: L) -> ValuesSourceConfig {
        self.missing = Some(missing.into());
        self
    }

    /// The declared value domain.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The targeted field, if any.
    pub fn field_context(&self) -> Option<&FieldContext> {
        self.field_context.as_ref()
    }

    /// The computed-value script, if any.
    pub fn script(&self) -> Option<&ScriptDescriptor> {
        self.script.as_ref()
    }

    /// The raw missing literal, if any.
    pub fn missing(&self) -> Option<&Literal> {
        self.missing.as_ref()
    }

    /// True when the target field is absent from this index's schema.
    pub fn is_unmapped(&self) -> bool {
        self.unmapped
    }

    /// A config must name at least one way to produce values.
    pub fn is_valid(&self) -> bool {
        self.field_context.is_some() || self.script.is_some() || self.unmapped
    }
}
