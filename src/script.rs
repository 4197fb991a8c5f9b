//! The computed-value seam.
//!
//! Script compilation and execution live outside this crate; resolution only
//! needs an evaluator that can produce a value per document, or transform a
//! value an inner source produced.

use std::fmt;
use std::sync::Arc;

use crate::config::ValueType;
use crate::DocId;

/// A value produced by a script evaluator.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptValue {
    /// Numeric output.
    F64(f64),
    /// Byte-sequence output.
    Bytes(Vec<u8>),
}

/// External script evaluator.
///
/// Implementations must be pure per document: the same `doc` yields the same
/// values, so sources stay safely shareable across segments.
pub trait Script: Send + Sync {
    /// Appends the values computed for `doc` when the script is the sole
    /// source. Appending nothing means the document has no value.
    fn values_for_doc(&self, doc: DocId, vals: &mut Vec<ScriptValue>);

    /// Transforms one value produced by an inner source.
    fn transform(&self, value: ScriptValue) -> ScriptValue;
}

/// A computed-value specification: the evaluator plus an optional hint about
/// the value type it is expected to produce.
#[derive(Clone)]
pub struct ScriptDescriptor {
    script: Arc<dyn Script>,
    expected_value_type: Option<ValueType>,
}

impl ScriptDescriptor {
    /// Wraps an evaluator with no expected-type hint.
    pub fn new(script: Arc<dyn Script>) -> ScriptDescriptor {
        ScriptDescriptor {
            script,
            expected_value_type: None,
        }
    }

    /// Declares the value type the script is expected to produce. The hint is
    /// advisory; it does not change resolution dispatch.
    pub fn set_expected_value_type(mut self, value_type: ValueType) -> ScriptDescriptor {
        self.expected_value_type = Some(value_type);
        self
    }

    /// The evaluator handle.
    pub fn script(&self) -> &Arc<dyn Script> {
        &self.script
    }

    /// The expected-type hint, if declared.
    pub fn expected_value_type(&self) -> Option<ValueType> {
        self.expected_value_type
    }
}

impl fmt::Debug for ScriptDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptDescriptor")
            .field("expected_value_type", &self.expected_value_type)
            .finish_non_exhaustive()
    }
}
