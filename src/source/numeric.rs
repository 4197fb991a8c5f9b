//! Numeric value sources.

use std::fmt;
use std::sync::Arc;

use crate::fielddata::{NumericFieldData, NumericValues};
use crate::missing::MissingNumericValues;
use crate::script::{Script, ScriptDescriptor, ScriptValue};
use crate::{DocId, SegmentOrdinal};

/// A source of `f64` values.
pub enum Numeric {
    /// Backed by a numeric column of the index.
    FieldData(Arc<dyn NumericFieldData>),
    /// Computed per document by a script.
    Script(ScriptDescriptor),
    /// Field values transformed per value by a script.
    WithScript {
        /// The field-backed source the script transforms.
        inner: Box<Numeric>,
        /// The transforming script.
        script: ScriptDescriptor,
    },
    /// Substitutes `missing` for documents without stored values.
    WithMissing {
        /// The wrapped source.
        inner: Box<Numeric>,
        /// The substituted value.
        missing: f64,
    },
    /// Produces no stored values for any document.
    Empty,
}

impl Numeric {
    /// Opens a per-segment reader.
    pub fn doubles(&self, segment: SegmentOrdinal) -> crate::Result<Box<dyn NumericValues>> {
        match self {
            Numeric::FieldData(field_data) => Ok(field_data.doubles(segment)?),
            Numeric::Script(descriptor) => Ok(Box::new(ScriptDoubleValues {
                script: Arc::clone(descriptor.script()),
                raw: Vec::new(),
            })),
            Numeric::WithScript { inner, script } => Ok(Box::new(DoubleValuesWithScript {
                inner: inner.doubles(segment)?,
                script: Arc::clone(script.script()),
                buf: Vec::new(),
            })),
            Numeric::WithMissing { inner, missing } => Ok(Box::new(MissingNumericValues::new(
                inner.doubles(segment)?,
                *missing,
            ))),
            Numeric::Empty => Ok(Box::new(EmptyDoubleValues)),
        }
    }
}

impl fmt::Debug for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::FieldData(_) => f.write_str("Numeric::FieldData"),
            Numeric::Script(descriptor) => write!(f, "Numeric::Script({descriptor:?})"),
            Numeric::WithScript { inner, .. } => write!(f, "Numeric::WithScript({inner:?})"),
            Numeric::WithMissing { inner, missing } => {
                write!(f, "Numeric::WithMissing({inner:?}, {missing})")
            }
            Numeric::Empty => f.write_str("Numeric::Empty"),
        }
    }
}

/// Coercion of script output into the numeric domain. Byte output is parsed
/// as decimal text; values that cannot be coerced are dropped.
pub(crate) fn script_value_to_f64(value: ScriptValue) -> Option<f64> {
    match value {
        ScriptValue::F64(val) => Some(val),
        ScriptValue::Bytes(bytes) => std::str::from_utf8(&bytes).ok()?.trim().parse().ok(),
    }
}

struct EmptyDoubleValues;

impl NumericValues for EmptyDoubleValues {
    fn get_vals(&mut self, _doc: DocId, vals: &mut Vec<f64>) -> std::io::Result<()> {
        vals.clear();
        Ok(())
    }
}

struct ScriptDoubleValues {
    script: Arc<dyn Script>,
    raw: Vec<ScriptValue>,
}

impl NumericValues for ScriptDoubleValues {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<f64>) -> std::io::Result<()> {
        vals.clear();
        self.raw.clear();
        self.script.values_for_doc(doc, &mut self.raw);
        vals.extend(self.raw.drain(..).filter_map(script_value_to_f64));
        Ok(())
    }
}

struct DoubleValuesWithScript {
    inner: Box<dyn NumericValues>,
    script: Arc<dyn Script>,
    buf: Vec<f64>,
}

impl NumericValues for DoubleValuesWithScript {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<f64>) -> std::io::Result<()> {
        self.inner.get_vals(doc, &mut self.buf)?;
        vals.clear();
        let script = &self.script;
        vals.extend(self.buf.drain(..).filter_map(|val| {
            script_value_to_f64(script.transform(ScriptValue::F64(val)))
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::script::ScriptDescriptor;
    use crate::tests::{MemNumericFieldData, PlusTenScript};

    fn collect(source: &Numeric, segment: SegmentOrdinal, docs: u32) -> Vec<Vec<f64>> {
        let mut reader = source.doubles(segment).unwrap();
        let mut vals = Vec::new();
        (0..docs)
            .map(|doc| {
                reader.get_vals(doc, &mut vals).unwrap();
                vals.clone()
            })
            .collect()
    }

    #[test]
    fn test_field_data_source() {
        let source = Numeric::FieldData(Arc::new(MemNumericFieldData {
            segments: vec![vec![vec![1.0, 2.0], vec![]], vec![vec![7.0]]],
        }));
        assert_eq!(collect(&source, 0, 2), vec![vec![1.0, 2.0], vec![]]);
        assert_eq!(collect(&source, 1, 1), vec![vec![7.0]]);
    }

    #[test]
    fn test_script_source() {
        let source = Numeric::Script(ScriptDescriptor::new(Arc::new(PlusTenScript)));
        assert_eq!(collect(&source, 0, 2), vec![vec![10.0], vec![11.0]]);
    }

    #[test]
    fn test_with_script_transforms_field_values() {
        let inner = Numeric::FieldData(Arc::new(MemNumericFieldData {
            segments: vec![vec![vec![1.0], vec![]]],
        }));
        let source = Numeric::WithScript {
            inner: Box::new(inner),
            script: ScriptDescriptor::new(Arc::new(PlusTenScript)),
        };
        // Documents without stored values stay empty; the transform never
        // invents values.
        assert_eq!(collect(&source, 0, 2), vec![vec![11.0], vec![]]);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(collect(&Numeric::Empty, 0, 3), vec![Vec::<f64>::new(); 3]);
    }

    #[test]
    fn test_script_bytes_coercion() {
        assert_eq!(
            script_value_to_f64(ScriptValue::Bytes(b" 2.5 ".to_vec())),
            Some(2.5)
        );
        assert_eq!(script_value_to_f64(ScriptValue::Bytes(b"abc".to_vec())), None);
    }
}
