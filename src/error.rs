//! Definition of the crate's error and result.

use std::io;

use thiserror::Error;

use crate::config::ValueType;

/// Typed failures of value-source resolution.
///
/// Every variant aborts resolution for the one aggregation build that
/// triggered it; there are no retries and no partial recovery at this layer.
#[derive(Debug, Error)]
pub enum ValuesSourceError {
    /// The config names neither a field context, nor a script, nor the
    /// unmapped marker.
    #[error("invalid values source config: {0}")]
    InvalidConfig(&'static str),
    /// A script-only source was requested for a domain that has no
    /// script-backed variant.
    #[error("values source of type [{0}] is not supported by scripts")]
    UnsupportedScriptDomain(ValueType),
    /// The field's storage capability disagrees with the requested domain.
    #[error("expected {expected} values on field [{field}], but got type [{actual}]")]
    TypeMismatch {
        /// Name of the offending field.
        field: String,
        /// The domain the aggregation asked for.
        expected: ValueType,
        /// The field's actual type name, as declared by its mapping.
        actual: String,
    },
    /// The `missing` literal cannot be parsed into the target domain.
    #[error("could not parse missing value [{literal}]: {reason}")]
    InvalidMissingValue {
        /// The offending literal, in its textual form.
        literal: String,
        /// Why parsing failed.
        reason: String,
    },
    /// The shared aggregation memory budget was exhausted.
    #[error("aggregation memory limit exceeded: limit {limit} bytes, current {current} bytes")]
    MemoryExceeded {
        /// The configured limit in bytes.
        limit: u64,
        /// The estimated consumption when the limit tripped.
        current: u64,
    },
    /// A storage accessor failed while opening a per-segment reader.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_names_the_actual_type() {
        let err = ValuesSourceError::TypeMismatch {
            field: "category".to_string(),
            expected: ValueType::Numeric,
            actual: "keyword".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[category]"), "{msg}");
        assert!(msg.contains("numeric"), "{msg}");
        assert!(msg.contains("[keyword]"), "{msg}");
    }
}
