//! Builds a concrete value source from a validated config.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::{ValueType, ValuesSourceConfig};
use crate::error::ValuesSourceError;
use crate::field_context::FieldContext;
use crate::fielddata::IndexFieldData;
use crate::format::NowResolver;
use crate::limits::AggregationLimits;
use crate::missing::replace_missing;
use crate::source::{Bytes, Geo, Numeric, ValuesSource, WithOrdinals};

/// Per-request execution state borrowed by resolution: the shared memory
/// budget and the reference instant for relative date literals.
///
/// One context serves one shard-level aggregation build; separate shards use
/// separate contexts and share nothing mutable.
#[derive(Clone)]
pub struct ExecutionContext {
    limits: AggregationLimits,
    now: NowResolver,
}

impl Default for ExecutionContext {
    fn default() -> ExecutionContext {
        ExecutionContext::new(AggregationLimits::default())
    }
}

impl ExecutionContext {
    /// A context with the given limits, resolving `now` at call time.
    pub fn new(limits: AggregationLimits) -> ExecutionContext {
        ExecutionContext {
            limits,
            now: Arc::new(OffsetDateTime::now_utc),
        }
    }

    /// Pins the instant that `now`-relative missing literals resolve
    /// against. One request should evaluate every relative literal against
    /// the same instant.
    pub fn set_now_resolver(mut self, now: NowResolver) -> ExecutionContext {
        self.now = now;
        self
    }

    /// The shared memory accounting handle.
    pub fn limits(&self) -> &AggregationLimits {
        &self.limits
    }

    /// The reference-instant resolver.
    pub fn now(&self) -> &NowResolver {
        &self.now
    }

    /// Builds the value source described by `config`.
    ///
    /// `Ok(None)` means no source can produce values on this shard (the
    /// field is unmapped and no missing value was given); the caller must
    /// treat the aggregation as having no data here.
    ///
    /// Unmapped `Bytes` *and* `Any` fields resolve to the ordinal-capable
    /// empty source. `Any` carries no ordinal guarantee of its own; routing
    /// it through the ordinal family is a deliberate special case kept for
    /// compatibility, not a statement about `Any` fields in general.
    pub fn resolve(&self, config: &ValuesSourceConfig) -> crate::Result<Option<ValuesSource>> {
        if !config.is_valid() {
            return Err(ValuesSourceError::InvalidConfig(
                "must have either a field context or a script or be marked as unmapped",
            ));
        }

        let source = if config.is_unmapped() {
            if config.missing().is_none() {
                // Nothing stored and nothing substituted: no values at all.
                return Ok(None);
            }
            match config.value_type() {
                ValueType::Numeric => ValuesSource::Numeric(Numeric::Empty),
                ValueType::GeoPoint => ValuesSource::GeoPoint(Geo::Empty),
                ValueType::Bytes | ValueType::Any => {
                    ValuesSource::Bytes(Bytes::WithOrdinals(WithOrdinals::Empty))
                }
            }
        } else {
            self.build_original(config)?
        };

        match config.missing() {
            None => Ok(Some(source)),
            Some(missing) => Ok(Some(replace_missing(
                source,
                missing,
                config.field_context(),
                self,
            )?)),
        }
    }

    /// The source before any missing-value substitution.
    fn build_original(&self, config: &ValuesSourceConfig) -> crate::Result<ValuesSource> {
        let Some(field_context) = config.field_context() else {
            let descriptor = config.script().ok_or(ValuesSourceError::InvalidConfig(
                "a source without a field context requires a script",
            ))?;
            return match config.value_type() {
                ValueType::Numeric => {
                    Ok(ValuesSource::Numeric(Numeric::Script(descriptor.clone())))
                }
                ValueType::Bytes | ValueType::Any => {
                    Ok(ValuesSource::Bytes(Bytes::Script(descriptor.clone())))
                }
                ValueType::GeoPoint => {
                    Err(ValuesSourceError::UnsupportedScriptDomain(ValueType::GeoPoint))
                }
            };
        };

        match config.value_type() {
            ValueType::Numeric => numeric_field(field_context, config),
            ValueType::GeoPoint => geo_point_field(field_context, config),
            ValueType::Bytes | ValueType::Any => bytes_field(field_context, config),
        }
    }
}

fn type_mismatch(field_context: &FieldContext, expected: ValueType) -> ValuesSourceError {
    ValuesSourceError::TypeMismatch {
        field: field_context.field().to_string(),
        expected,
        actual: field_context.type_name().to_string(),
    }
}

fn numeric_field(
    field_context: &FieldContext,
    config: &ValuesSourceConfig,
) -> crate::Result<ValuesSource> {
    let IndexFieldData::Numeric(field_data) = field_context.field_data() else {
        return Err(type_mismatch(field_context, ValueType::Numeric));
    };
    let mut source = Numeric::FieldData(Arc::clone(field_data));
    if let Some(descriptor) = config.script() {
        source = Numeric::WithScript {
            inner: Box::new(source),
            script: descriptor.clone(),
        };
    }
    Ok(ValuesSource::Numeric(source))
}

fn bytes_field(
    field_context: &FieldContext,
    config: &ValuesSourceConfig,
) -> crate::Result<ValuesSource> {
    // Capability priority: join semantics first, then plain global ordinals,
    // then raw bytes.
    let mut source = match field_context.field_data() {
        IndexFieldData::ParentChild(field_data) => {
            Bytes::WithOrdinals(WithOrdinals::ParentChild(Arc::clone(field_data)))
        }
        IndexFieldData::Ordinals(field_data) => {
            Bytes::WithOrdinals(WithOrdinals::FieldData(Arc::clone(field_data)))
        }
        IndexFieldData::Bytes(field_data) => Bytes::FieldData(Arc::clone(field_data)),
        IndexFieldData::Numeric(_) | IndexFieldData::GeoPoint(_) => {
            return Err(type_mismatch(field_context, config.value_type()));
        }
    };
    if let Some(descriptor) = config.script() {
        // The wrap deliberately leaves the ordinal family: scripted output
        // does not preserve ordinal identity.
        source = Bytes::WithScript {
            inner: Box::new(source),
            script: descriptor.clone(),
        };
    }
    Ok(ValuesSource::Bytes(source))
}

fn geo_point_field(
    field_context: &FieldContext,
    _config: &ValuesSourceConfig,
) -> crate::Result<ValuesSource> {
    let IndexFieldData::GeoPoint(field_data) = field_context.field_data() else {
        return Err(type_mismatch(field_context, ValueType::GeoPoint));
    };
    // A script next to a geo field is permitted but inert: no geo script
    // composition exists.
    Ok(ValuesSource::GeoPoint(Geo::FieldData(Arc::clone(
        field_data,
    ))))
}
