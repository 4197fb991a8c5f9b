//! The storage seam: per-field columnar accessors and their per-segment
//! readers.
//!
//! The index owns the actual columns; this crate only consumes handles to
//! them. Each handle can spawn one fresh reader per segment, so a single
//! immutable handle serves concurrent segment visits.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::source::GeoPoint;
use crate::{DocId, SegmentOrdinal};

/// Per-segment reader over numeric doc values.
///
/// `get_vals` replaces the contents of `vals` with the values of `doc`; an
/// empty buffer means the document has no stored value.
pub trait NumericValues {
    /// Fills `vals` with the values of `doc`.
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<f64>) -> io::Result<()>;
}

/// Per-segment reader over opaque byte-sequence doc values.
pub trait BytesValues {
    /// Fills `vals` with the values of `doc`. Empty means no stored value.
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<Vec<u8>>) -> io::Result<()>;
}

/// Per-segment reader over ordinal-deduplicated byte values.
///
/// Ordinals index a term dictionary sorted by term bytes; equal terms share
/// one ordinal, which is what makes ordinal-based grouping cheap.
pub trait OrdinalValues {
    /// Fills `ords` with the term ordinals of `doc`, in ascending order.
    /// Empty means no stored value.
    fn get_ords(&mut self, doc: DocId, ords: &mut Vec<u64>) -> io::Result<()>;

    /// Replaces the contents of `bytes` with the term for `ord`. Returns
    /// `false` if `ord` is outside the dictionary.
    fn ord_to_bytes(&self, ord: u64, bytes: &mut Vec<u8>) -> io::Result<bool>;

    /// Number of distinct terms in this segment's dictionary.
    fn num_ords(&self) -> u64;
}

/// Per-segment reader over geographic coordinates.
pub trait GeoPointValues {
    /// Fills `vals` with the points of `doc`. Empty means no stored value.
    fn get_vals(&mut self, doc: DocId, vals: &mut Vec<GeoPoint>) -> io::Result<()>;
}

/// Index-level handle to a numeric column family.
pub trait NumericFieldData: Send + Sync {
    /// Opens a reader for one segment.
    fn doubles(&self, segment: SegmentOrdinal) -> io::Result<Box<dyn NumericValues>>;
}

/// Index-level handle to a plain (non-ordinal) bytes column family.
pub trait BytesFieldData: Send + Sync {
    /// Opens a reader for one segment.
    fn bytes(&self, segment: SegmentOrdinal) -> io::Result<Box<dyn BytesValues>>;
}

/// Index-level handle to an ordinal-deduplicated bytes column family.
pub trait OrdinalsFieldData: Send + Sync {
    /// Opens a reader for one segment.
    fn ordinals(&self, segment: SegmentOrdinal) -> io::Result<Box<dyn OrdinalValues>>;
}

/// An ordinal field that additionally encodes a join relationship between
/// documents.
pub trait ParentChildFieldData: OrdinalsFieldData {
    /// Names of the join relations encoded by this field.
    fn relations(&self) -> Vec<String>;
}

/// Index-level handle to a geo-point column family.
pub trait GeoPointFieldData: Send + Sync {
    /// Opens a reader for one segment.
    fn points(&self, segment: SegmentOrdinal) -> io::Result<Box<dyn GeoPointValues>>;
}

/// A field's storage accessor, tagged by capability.
///
/// The variant *is* the capability classification: resolution dispatches by
/// matching on it, never by downcasting.
#[derive(Clone)]
pub enum IndexFieldData {
    /// Supports numeric values.
    Numeric(Arc<dyn NumericFieldData>),
    /// Supports plain byte values, without a term dictionary.
    Bytes(Arc<dyn BytesFieldData>),
    /// Supports ordinal-deduplicated byte values.
    Ordinals(Arc<dyn OrdinalsFieldData>),
    /// Ordinal byte values with join semantics.
    ParentChild(Arc<dyn ParentChildFieldData>),
    /// Supports geographic coordinates.
    GeoPoint(Arc<dyn GeoPointFieldData>),
}

impl IndexFieldData {
    /// Short capability name, for diagnostics.
    pub fn capability_name(&self) -> &'static str {
        match self {
            IndexFieldData::Numeric(_) => "numeric",
            IndexFieldData::Bytes(_) => "bytes",
            IndexFieldData::Ordinals(_) => "ordinals",
            IndexFieldData::ParentChild(_) => "parent_child",
            IndexFieldData::GeoPoint(_) => "geo_point",
        }
    }
}

impl fmt::Debug for IndexFieldData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexFieldData({})", self.capability_name())
    }
}
