//! Bytes value sources, with the ordinal-capable sub-family.

use std::fmt;
use std::sync::Arc;

use crate::fielddata::{
    BytesFieldData, BytesValues, OrdinalValues, OrdinalsFieldData, ParentChildFieldData,
};
use crate::limits::AggregationLimits;
use crate::missing::{MissingBytesValues, MissingOrdinalValues};
use crate::script::{Script, ScriptDescriptor, ScriptValue};
use crate::{DocId, SegmentOrdinal};

/// A source of opaque byte-sequence values.
///
/// Script-wrapped sources live in this family even when the wrapped source is
/// ordinal-capable: a script's output is not guaranteed to preserve the
/// field's ordinal identity, so ordinal-based optimizations must not be
/// applied downstream of a script.
pub enum Bytes {
    /// Backed by a plain bytes column of the index.
    FieldData(Arc<dyn BytesFieldData>),
    /// Computed per document by a script.
    Script(ScriptDescriptor),
    /// Values of an inner bytes source transformed per value by a script.
    WithScript {
        /// The wrapped source, ordinal-capable or not.
        inner: Box<Bytes>,
        /// The transforming script.
        script: ScriptDescriptor,
    },
    /// The ordinal-capable sub-family.
    WithOrdinals(WithOrdinals),
    /// Substitutes `missing` for documents without stored values.
    WithMissing {
        /// The wrapped source.
        inner: Box<Bytes>,
        /// The substituted value.
        missing: Vec<u8>,
    },
    /// Produces no stored values for any document.
    Empty,
}

/// A bytes source whose values are deduplicated through a sorted term
/// dictionary.
pub enum WithOrdinals {
    /// Backed by an ordinal column of the index.
    FieldData(Arc<dyn OrdinalsFieldData>),
    /// Backed by a relation-aware join field.
    ParentChild(Arc<dyn ParentChildFieldData>),
    /// Substitutes `missing` for documents without stored values, widening
    /// the ordinal space by one term when the dictionary lacks it.
    WithMissing {
        /// The wrapped source.
        inner: Box<WithOrdinals>,
        /// The substituted term.
        missing: Vec<u8>,
        /// Accounting handle for the per-segment probe buffers.
        limits: AggregationLimits,
    },
    /// An empty dictionary; no document has stored values.
    Empty,
}

impl Bytes {
    /// Opens a per-segment reader over raw byte values.
    pub fn bytes(&self, segment: SegmentOrdinal) -> crate::Result<Box<dyn BytesValues>> {
        match self {
            Bytes::FieldData(field_data) => Ok(field_data.bytes(segment)?),
            Bytes::Script(descriptor) => Ok(Box::new(ScriptBytesValues {
                script: Arc::clone(descriptor.script()),
                raw: Vec::new(),
            })),
            Bytes::WithScript { inner, script } => Ok(Box::new(BytesValuesWithScript {
                inner: inner.bytes(segment)?,
                script: Arc::clone(script.script()),
                buf: Vec::new(),
            })),
            Bytes::WithOrdinals(with_ordinals) => Ok(Box::new(OrdsAsBytesValues {
                ords: with_ordinals.ordinals(segment)?,
                ord_buf: Vec::new(),
            })),
            Bytes::WithMissing { inner, missing } => Ok(Box::new(MissingBytesValues::new(
                inner.bytes(segment)?,
                missing.clone(),
            ))),
            Bytes::Empty => Ok(Box::new(EmptyBytesValues)),
        }
    }

    /// Whether ordinal-based optimizations may be applied to this source.
    pub fn has_ordinals(&self) -> bool {
        matches!(self, Bytes::WithOrdinals(_))
    }
}

impl WithOrdinals {
    /// Opens a per-segment reader over term ordinals.
    pub fn ordinals(&self, segment: SegmentOrdinal) -> crate::Result<Box<dyn OrdinalValues>> {
        match self {
            WithOrdinals::FieldData(field_data) => Ok(field_data.ordinals(segment)?),
            WithOrdinals::ParentChild(field_data) => Ok(field_data.ordinals(segment)?),
            WithOrdinals::WithMissing {
                inner,
                missing,
                limits,
            } => Ok(Box::new(MissingOrdinalValues::new(
                inner.ordinals(segment)?,
                missing.clone(),
                limits,
            )?)),
            WithOrdinals::Empty => Ok(Box::new(EmptyOrdinalValues)),
        }
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bytes::FieldData(_) => f.write_str("Bytes::FieldData"),
            Bytes::Script(descriptor) => write!(f, "Bytes::Script({descriptor:?})"),
            Bytes::WithScript { inner, .. } => write!(f, "Bytes::WithScript({inner:?})"),
            Bytes::WithOrdinals(with_ordinals) => with_ordinals.fmt(f),
            Bytes::WithMissing { inner, .. } => write!(f, "Bytes::WithMissing({inner:?})"),
            Bytes::Empty => f.write_str("Bytes::Empty"),
        }
    }
}

impl fmt::Debug for WithOrdinals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithOrdinals::FieldData(_) => f.write_str("WithOrdinals::FieldData"),
            WithOrdinals::ParentChild(_) => f.write_str("WithOrdinals::ParentChild"),
            WithOrdinals::WithMissing { inner, .. } => {
                write!(f, "WithOrdinals::WithMissing({inner:?})")
            }
            WithOrdinals::Empty => f.write_str("WithOrdinals::Empty"),
        }
    }
}

/// Coercion of script output into the bytes domain. Numeric output is
/// rendered through its decimal text form.
pub(crate) fn script_value_to_bytes(value: ScriptValue) -> Vec<u8> {
    match value {
        ScriptValue::F64(val) => val.to_string().into_bytes(),
        ScriptValue::Bytes(bytes) => bytes,
    }
}

struct EmptyBytesValues;

impl BytesValues for EmptyBytesValues {
    fn get_vals(&mut self, _doc: DocId, vals: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
        vals.clear();
        Ok(())
    }
}

struct EmptyOrdinalValues;

impl OrdinalValues for EmptyOrdinalValues {
    fn get_ords(&mut self, _doc: DocId, ords: &mut Vec<u64>) -> std::io::Result<()> {
        ords.clear();
        Ok(())
    }

    fn ord_to_bytes(&self, _ord: u64, bytes: &mut Vec<u8>) -> std::io::Result<bool> {
        bytes.clear();
        Ok(false)
    }

    fn num_ords(&self) -> u64 {
        0
    }
}

struct ScriptBytesValues {
    script: Arc<dyn Script>,
    raw: Vec<ScriptValue>,
}

impl BytesValues for ScriptBytesValues {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
        vals.clear();
        self.raw.clear();
        self.script.values_for_doc(doc, &mut self.raw);
        vals.extend(self.raw.drain(..).map(script_value_to_bytes));
        Ok(())
    }
}

struct BytesValuesWithScript {
    inner: Box<dyn BytesValues>,
    script: Arc<dyn Script>,
    buf: Vec<Vec<u8>>,
}

impl BytesValues for BytesValuesWithScript {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
        self.inner.get_vals(doc, &mut self.buf)?;
        vals.clear();
        let script = &self.script;
        vals.extend(
            self.buf
                .drain(..)
                .map(|val| script_value_to_bytes(script.transform(ScriptValue::Bytes(val)))),
        );
        Ok(())
    }
}

/// Serves raw byte values through an ordinal reader's dictionary.
struct OrdsAsBytesValues {
    ords: Box<dyn OrdinalValues>,
    ord_buf: Vec<u64>,
}

impl BytesValues for OrdsAsBytesValues {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
        self.ords.get_ords(doc, &mut self.ord_buf)?;
        vals.clear();
        for &ord in &self.ord_buf {
            let mut bytes = Vec::new();
            if self.ords.ord_to_bytes(ord, &mut bytes)? {
                vals.push(bytes);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::script::ScriptDescriptor;
    use crate::tests::{MemBytesFieldData, MemOrdinalsFieldData, UppercaseScript};

    fn collect(source: &Bytes, segment: SegmentOrdinal, docs: u32) -> Vec<Vec<Vec<u8>>> {
        let mut reader = source.bytes(segment).unwrap();
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
        let source = Bytes::FieldData(Arc::new(MemBytesFieldData {
            segments: vec![vec![vec![b"red".to_vec()], vec![]]],
        }));
        assert_eq!(collect(&source, 0, 2), vec![vec![b"red".to_vec()], vec![]]);
        assert!(!source.has_ordinals());
    }

    #[test]
    fn test_ordinals_serve_bytes_in_dictionary_order() {
        let field_data =
            MemOrdinalsFieldData::single_segment(&[vec!["red", "blue"], vec![], vec!["blue"]]);
        let source = Bytes::WithOrdinals(WithOrdinals::FieldData(field_data));
        assert!(source.has_ordinals());
        assert_eq!(
            collect(&source, 0, 3),
            vec![
                // ords ascending means dictionary order, not insertion order
                vec![b"blue".to_vec(), b"red".to_vec()],
                vec![],
                vec![b"blue".to_vec()],
            ]
        );
    }

    #[test]
    fn test_script_source_renders_numbers_as_text() {
        let source = Bytes::Script(ScriptDescriptor::new(Arc::new(UppercaseScript)));
        assert_eq!(collect(&source, 0, 1), vec![vec![b"doc0".to_vec()]]);
        assert_eq!(script_value_to_bytes(ScriptValue::F64(2.5)), b"2.5".to_vec());
    }

    #[test]
    fn test_with_script_transforms_ordinal_values() {
        let field_data = MemOrdinalsFieldData::single_segment(&[vec!["red"], vec![]]);
        let source = Bytes::WithScript {
            inner: Box::new(Bytes::WithOrdinals(WithOrdinals::FieldData(field_data))),
            script: ScriptDescriptor::new(Arc::new(UppercaseScript)),
        };
        assert!(!source.has_ordinals());
        assert_eq!(collect(&source, 0, 2), vec![vec![b"RED".to_vec()], vec![]]);
    }

    #[test]
    fn test_empty_sources() {
        assert_eq!(collect(&Bytes::Empty, 0, 2), vec![vec![], vec![]] as Vec<Vec<Vec<u8>>>);
        let empty_ords = WithOrdinals::Empty.ordinals(0).unwrap();
        assert_eq!(empty_ords.num_ords(), 0);
        assert_eq!(
            collect(&Bytes::WithOrdinals(WithOrdinals::Empty), 0, 2),
            vec![vec![], vec![]] as Vec<Vec<Vec<u8>>>
        );
    }
}
