//! Missing-value substitution.
//!
//! A missing decorator wraps a value source and yields exactly one
//! substituted value for documents the inner source has nothing for; stored
//! values pass through unchanged. Substitution is evaluated per document at
//! read time, never cached.

use std::io;

use crate::config::Literal;
use crate::error::ValuesSourceError;
use crate::field_context::FieldContext;
use crate::fielddata::{BytesValues, GeoPointValues, NumericValues, OrdinalValues};
use crate::format::{NowResolver, ValueFormat};
use crate::limits::{AggregationLimits, ResourceLimitGuard};
use crate::resolver::ExecutionContext;
use crate::source::{Bytes, Geo, GeoPoint, Numeric, ValuesSource, WithOrdinals};
use crate::DocId;

/// Wraps `source` so that documents without stored values yield the parsed
/// `missing` literal.
///
/// Dispatch is on the runtime variant of `source`, not on the declared
/// domain: a script-wrapped bytes source built from an ordinal field gets the
/// plain bytes decorator, because the wrap stripped its ordinal capability.
pub(crate) fn replace_missing(
    source: ValuesSource,
    missing: &Literal,
    field_context: Option<&FieldContext>,
    ctx: &ExecutionContext,
) -> crate::Result<ValuesSource> {
    match source {
        ValuesSource::Bytes(Bytes::WithOrdinals(inner)) => Ok(ValuesSource::Bytes(
            Bytes::WithOrdinals(WithOrdinals::WithMissing {
                inner: Box::new(inner),
                missing: missing.to_string().into_bytes(),
                limits: ctx.limits().clone(),
            }),
        )),
        ValuesSource::Bytes(inner) => Ok(ValuesSource::Bytes(Bytes::WithMissing {
            inner: Box::new(inner),
            missing: missing.to_string().into_bytes(),
        })),
        ValuesSource::Numeric(inner) => Ok(ValuesSource::Numeric(Numeric::WithMissing {
            inner: Box::new(inner),
            missing: parse_numeric_missing(missing, field_context, ctx.now())?,
        })),
        ValuesSource::GeoPoint(inner) => Ok(ValuesSource::GeoPoint(Geo::WithMissing {
            inner: Box::new(inner),
            missing: parse_geo_missing(missing)?,
        })),
    }
}

/// Already-numeric literals are used directly; textual ones go through the
/// field's value format when a field is resolved, and plain decimal parsing
/// otherwise.
fn parse_numeric_missing(
    missing: &Literal,
    field_context: Option<&FieldContext>,
    now: &NowResolver,
) -> crate::Result<f64> {
    if let Literal::F64(val) = missing {
        return Ok(*val);
    }
    let format = field_context
        .map(FieldContext::value_format)
        .unwrap_or(ValueFormat::Decimal);
    format.parse_f64(&missing.to_string(), now)
}

fn parse_geo_missing(missing: &Literal) -> crate::Result<GeoPoint> {
    missing
        .to_string()
        .parse()
        .map_err(|err| ValuesSourceError::InvalidMissingValue {
            literal: missing.to_string(),
            reason: format!("{err}"),
        })
}

pub(crate) struct MissingNumericValues {
    inner: Box<dyn NumericValues>,
    missing: f64,
}

impl MissingNumericValues {
    pub(crate) fn new(inner: Box<dyn NumericValues>, missing: f64) -> MissingNumericValues {
        MissingNumericValues { inner, missing }
    }
}

impl NumericValues for MissingNumericValues {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<f64>) -> io::Result<()> {
        self.inner.get_vals(doc, vals)?;
        if vals.is_empty() {
            vals.push(self.missing);
        }
        Ok(())
    }
}

pub(crate) struct MissingBytesValues {
    inner: Box<dyn BytesValues>,
    missing: Vec<u8>,
}

impl MissingBytesValues {
    pub(crate) fn new(inner: Box<dyn BytesValues>, missing: Vec<u8>) -> MissingBytesValues {
        MissingBytesValues { inner, missing }
    }
}

impl BytesValues for MissingBytesValues {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<Vec<u8>>) -> io::Result<()> {
        self.inner.get_vals(doc, vals)?;
        if vals.is_empty() {
            vals.push(self.missing.clone());
        }
        Ok(())
    }
}

pub(crate) struct MissingGeoPointValues {
    inner: Box<dyn GeoPointValues>,
    missing: GeoPoint,
}

impl MissingGeoPointValues {
    pub(crate) fn new(inner: Box<dyn GeoPointValues>, missing: GeoPoint) -> MissingGeoPointValues {
        MissingGeoPointValues { inner, missing }
    }
}

impl GeoPointValues for MissingGeoPointValues {
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<GeoPoint>) -> io::Result<()> {
        self.inner.get_vals(doc, vals)?;
        if vals.is_empty() {
            vals.push(self.missing);
        }
        Ok(())
    }
}

/// Ordinal reader with the missing term spliced into the sorted ordinal
/// space.
///
/// When the segment dictionary lacks the missing term, it is inserted at its
/// sort position and every stored ordinal at or above that position shifts up
/// by one, keeping `ord_to_bytes` order-preserving. Documents without stored
/// ordinals yield exactly the missing ordinal.
pub(crate) struct MissingOrdinalValues {
    inner: Box<dyn OrdinalValues>,
    missing: Vec<u8>,
    missing_ord: u64,
    /// True when the missing term already exists in the inner dictionary.
    term_exists: bool,
    _guard: ResourceLimitGuard,
}

impl MissingOrdinalValues {
    pub(crate) fn new(
        inner: Box<dyn OrdinalValues>,
        missing: Vec<u8>,
        limits: &AggregationLimits,
    ) -> crate::Result<MissingOrdinalValues> {
        let mut guard = limits.new_guard();
        let mut term_buf = Vec::with_capacity(missing.len());
        guard.add_memory_consumed((missing.capacity() + term_buf.capacity()) as u64)?;

        // Lower-bound binary search over the sorted dictionary.
        let mut lo = 0u64;
        let mut hi = inner.num_ords();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            inner.ord_to_bytes(mid, &mut term_buf)?;
            if term_buf.as_slice() < missing.as_slice() {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let missing_ord = lo;
        let term_exists = missing_ord < inner.num_ords() && {
            inner.ord_to_bytes(missing_ord, &mut term_buf)?;
            term_buf == missing
        };

        Ok(MissingOrdinalValues {
            inner,
            missing,
            missing_ord,
            term_exists,
            _guard: guard,
        })
    }
}

impl OrdinalValues for MissingOrdinalValues {
    fn get_ords(&mut self, doc: DocId, ords: &mut Vec<u64>) -> io::Result<()> {
        self.inner.get_ords(doc, ords)?;
        if ords.is_empty() {
            ords.push(self.missing_ord);
            return Ok(());
        }
        if !self.term_exists {
            for ord in ords.iter_mut() {
                if *ord >= self.missing_ord {
                    *ord += 1;
                }
            }
        }
        Ok(())
    }

    fn ord_to_bytes(&self, ord: u64, bytes: &mut Vec<u8>) -> io::Result<bool> {
        if self.term_exists {
            return self.inner.ord_to_bytes(ord, bytes);
        }
        match ord.cmp(&self.missing_ord) {
            std::cmp::Ordering::Less => self.inner.ord_to_bytes(ord, bytes),
            std::cmp::Ordering::Equal => {
                bytes.clear();
                bytes.extend_from_slice(&self.missing);
                Ok(true)
            }
            std::cmp::Ordering::Greater => self.inner.ord_to_bytes(ord - 1, bytes),
        }
    }

    fn num_ords(&self) -> u64 {
        if self.term_exists {
            self.inner.num_ords()
        } else {
            self.inner.num_ords() + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests::MemOrdinalsFieldData;

    fn ordinal_source_with_missing(
        docs: &[Vec<&str>],
        missing: &str,
        limits: &AggregationLimits,
    ) -> WithOrdinals {
        let field_data = MemOrdinalsFieldData::single_segment(docs);
        WithOrdinals::WithMissing {
            inner: Box::new(WithOrdinals::FieldData(field_data)),
            missing: missing.as_bytes().to_vec(),
            limits: limits.clone(),
        }
    }

    fn term_of(reader: &dyn OrdinalValues, ord: u64) -> String {
        let mut buf = Vec::new();
        assert!(reader.ord_to_bytes(ord, &mut buf).unwrap());
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_missing_term_absent_from_dictionary() {
        let limits = AggregationLimits::default();
        // dictionary: [blue, red]; "green" sorts between them
        let source = ordinal_source_with_missing(
            &[vec!["red"], vec![], vec!["blue", "red"]],
            "green",
            &limits,
        );
        let mut reader = source.ordinals(0).unwrap();
        assert_eq!(reader.num_ords(), 3);
        assert_eq!(term_of(reader.as_ref(), 0), "blue");
        assert_eq!(term_of(reader.as_ref(), 1), "green");
        assert_eq!(term_of(reader.as_ref(), 2), "red");

        let mut ords = Vec::new();
        reader.get_ords(0, &mut ords).unwrap();
        assert_eq!(ords, vec![2]); // red shifted past the inserted term
        reader.get_ords(1, &mut ords).unwrap();
        assert_eq!(ords, vec![1]); // the missing ordinal
        reader.get_ords(2, &mut ords).unwrap();
        assert_eq!(ords, vec![0, 2]);
    }

    #[test]
    fn test_missing_term_already_in_dictionary() {
        let limits = AggregationLimits::default();
        let source =
            ordinal_source_with_missing(&[vec!["blue"], vec![], vec!["red"]], "red", &limits);
        let mut reader = source.ordinals(0).unwrap();
        assert_eq!(reader.num_ords(), 2);

        let mut ords = Vec::new();
        reader.get_ords(0, &mut ords).unwrap();
        assert_eq!(ords, vec![0]);
        reader.get_ords(1, &mut ords).unwrap();
        assert_eq!(ords, vec![1]); // reuses red's existing ordinal
        reader.get_ords(2, &mut ords).unwrap();
        assert_eq!(ords, vec![1]);
    }

    #[test]
    fn test_missing_over_empty_dictionary() {
        let limits = AggregationLimits::default();
        let source = WithOrdinals::WithMissing {
            inner: Box::new(WithOrdinals::Empty),
            missing: b"fallback".to_vec(),
            limits: limits.clone(),
        };
        let mut reader = source.ordinals(0).unwrap();
        assert_eq!(reader.num_ords(), 1);
        assert_eq!(term_of(reader.as_ref(), 0), "fallback");
        let mut ords = Vec::new();
        reader.get_ords(7, &mut ords).unwrap();
        assert_eq!(ords, vec![0]);
    }

    #[test]
    fn test_probe_buffers_are_accounted_and_released() {
        let limits = AggregationLimits::new(Some(1_000));
        let source = ordinal_source_with_missing(&[vec!["red"]], "green", &limits);
        let reader = source.ordinals(0).unwrap();
        assert!(limits.memory_consumed() > 0);
        drop(reader);
        assert_eq!(limits.memory_consumed(), 0);
    }

    #[test]
    fn test_numeric_substitution_passes_stored_values_through() {
        let inner: Box<dyn NumericValues> = Numeric::FieldData(Arc::new(
            crate::tests::MemNumericFieldData {
                segments: vec![vec![vec![3.0], vec![]]],
            },
        ))
        .doubles(0)
        .unwrap();
        let mut reader = MissingNumericValues::new(inner, 5.0);
        let mut vals = Vec::new();
        reader.get_vals(0, &mut vals).unwrap();
        assert_eq!(vals, vec![3.0]);
        reader.get_vals(1, &mut vals).unwrap();
        assert_eq!(vals, vec![5.0]);
    }
}
