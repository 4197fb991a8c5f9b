//! The polymorphic runtime accessor family.
//!
//! A value source is a stateless, immutable description of *how* to obtain
//! per-document values; it is not itself the per-document iterator. Every
//! segment obtains its own reader from the same source, and decorators
//! (script transforms, missing-value substitution) take ownership of the
//! source they wrap.

use std::fmt;

pub(crate) mod bytes;
pub(crate) mod geo;
pub(crate) mod numeric;

pub use bytes::{Bytes, WithOrdinals};
pub use geo::{Geo, GeoPoint, GeoPointParseError};
pub use numeric::Numeric;

/// A resolved value source, closed over the three value domains.
pub enum ValuesSource {
    /// `f64` values.
    Numeric(Numeric),
    /// Opaque byte sequences, possibly ordinal-deduplicated.
    Bytes(Bytes),
    /// Geographic coordinates.
    GeoPoint(Geo),
}

impl fmt::Debug for ValuesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuesSource::Numeric(numeric) => numeric.fmt(f),
            ValuesSource::Bytes(bytes) => bytes.fmt(f),
            ValuesSource::GeoPoint(geo) => geo.fmt(f),
        }
    }
}
