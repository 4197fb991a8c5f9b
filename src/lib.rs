//! # Value-source resolution
//!
//! This crate turns a declarative aggregation field/script configuration into
//! a concrete, typed runtime accessor, a [`ValuesSource`], used to extract
//! per-document values during search-time aggregation collection.
//!
//! A [`ValuesSourceConfig`] names an abstract value domain ([`ValueType`]), an
//! optional indexed field ([`FieldContext`]), an optional computed-value
//! script ([`ScriptDescriptor`](script::ScriptDescriptor)), an optional
//! `missing` fallback literal and an `unmapped` marker for fields absent from
//! the index schema. [`ExecutionContext::resolve`] validates the config,
//! builds a field-backed, script-backed or empty source, and layers the
//! missing-value substitution on top.
//!
//! ## Prerequisite
//! Field-backed sources read from columnar per-segment storage owned by the
//! caller. The storage seam is the [`fielddata`] trait family; this crate
//! never opens or owns storage itself.
//!
//! ## Usage
//! ```
//! use std::io;
//! use std::sync::Arc;
//!
//! use values_source::fielddata::{IndexFieldData, NumericFieldData, NumericValues};
//! use values_source::{
//!     DocId, ExecutionContext, FieldContext, SegmentOrdinal, ValueType, ValuesSource,
//!     ValuesSourceConfig,
//! };
//!
//! struct PriceColumn(Vec<Vec<f64>>);
//! struct PriceColumnValues(Vec<Vec<f64>>);
//!
//! impl NumericFieldData for PriceColumn {
//!     fn doubles(&self, _segment: SegmentOrdinal) -> io::Result<Box<dyn NumericValues>> {
//!         Ok(Box::new(PriceColumnValues(self.0.clone())))
//!     }
//! }
//!
//! impl NumericValues for PriceColumnValues {
//!     fn get_vals(&mut self, doc: DocId, vals: &mut Vec<f64>) -> io::Result<()> {
//!         vals.clear();
//!         if let Some(doc_vals) = self.0.get(doc as usize) {
//!             vals.extend_from_slice(doc_vals);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> values_source::Result<()> {
//! // One segment; doc 0 has a stored price, doc 1 has none.
//! let field_data = IndexFieldData::Numeric(Arc::new(PriceColumn(vec![vec![3.0], vec![]])));
//! let config = ValuesSourceConfig::new(ValueType::Numeric)
//!     .set_field_context(FieldContext::new("price", "f64", field_data))
//!     .set_missing(5.0);
//!
//! let ctx = ExecutionContext::default();
//! let source = ctx.resolve(&config)?.expect("field-backed config always resolves");
//! let ValuesSource::Numeric(numeric) = source else { unreachable!() };
//!
//! let mut reader = numeric.doubles(0)?;
//! let mut vals = Vec::new();
//! reader.get_vals(0, &mut vals)?;
//! assert_eq!(vals, vec![3.0]);
//! reader.get_vals(1, &mut vals)?;
//! assert_eq!(vals, vec![5.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//! Resolution is synchronous and performs no I/O. A resolved [`ValuesSource`]
//! is immutable and `Send + Sync`; every segment obtains its own reader from
//! the same source, so callers may parallelize across segments freely.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod field_context;
pub mod fielddata;
pub mod format;
pub mod limits;
mod missing;
pub mod resolver;
pub mod script;
pub mod source;

pub use config::{Literal, ValueType, ValuesSourceConfig};
pub use error::ValuesSourceError;
pub use field_context::FieldContext;
pub use fielddata::IndexFieldData;
pub use format::{NowResolver, ValueFormat};
pub use limits::{AggregationLimits, ResourceLimitGuard};
pub use resolver::ExecutionContext;
pub use script::{Script, ScriptDescriptor, ScriptValue};
pub use source::{Bytes, Geo, GeoPoint, Numeric, ValuesSource, WithOrdinals};

/// The crate's result type.
pub type Result<T> = std::result::Result<T, ValuesSourceError>;

/// A document id, local to one segment.
pub type DocId = u32;

/// Identifies one segment of a shard, by position.
pub type SegmentOrdinal = u32;
