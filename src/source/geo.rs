//! Geo-point value sources.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fielddata::{GeoPointFieldData, GeoPointValues};
use crate::missing::MissingGeoPointValues;
use crate::{DocId, SegmentOrdinal};

/// A geographic coordinate, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in `[-90, 90]`.
    pub lat: f64,
    /// Longitude in `[-180, 180]`.
    pub lon: f64,
}

impl GeoPoint {
    /// A point from latitude/longitude degrees, without range validation.
    pub fn new(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }
}

/// Errors when parsing a textual `"lat,lon"` coordinate pair.
#[derive(Debug, PartialEq, Error)]
pub enum GeoPointParseError {
    /// Not a comma-separated pair of decimal degrees.
    #[error("expected a 'lat,lon' pair in '{0}'")]
    Malformed(String),
    /// A coordinate is outside the valid degree range.
    #[error("coordinates out of range in '{0}'")]
    OutOfRange(String),
}

impl FromStr for GeoPoint {
    type Err = GeoPointParseError;

    /// Parses the textual `"lat,lon"` form. Structured (non-text) coordinate
    /// representations are not supported.
    fn from_str(text: &str) -> Result<GeoPoint, GeoPointParseError> {
        let malformed = || GeoPointParseError::Malformed(text.to_string());
        let (lat, lon) = text.split_once(',').ok_or_else(malformed)?;
        let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
        let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoPointParseError::OutOfRange(text.to_string()));
        }
        Ok(GeoPoint { lat, lon })
    }
}

/// A source of geographic coordinates.
///
/// There is no script-backed or script-wrapped geo variant; a script next to
/// a geo field is inert.
pub enum Geo {
    /// Backed by a geo-point column of the index.
    FieldData(Arc<dyn GeoPointFieldData>),
    /// Substitutes `missing` for documents without stored values.
    WithMissing {
        /// The wrapped source.
        inner: Box<Geo>,
        /// The substituted point.
        missing: GeoPoint,
    },
    /// Produces no stored values for any document.
    Empty,
}

impl Geo {
    /// Opens a per-segment reader.
    pub fn points(&self, segment: SegmentOrdinal) -> crate::Result<Box<dyn GeoPointValues>> {
        match self {
            Geo::FieldData(field_data) => Ok(field_data.points(segment)?),
            Geo::WithMissing { inner, missing } => Ok(Box::new(MissingGeoPointValues::new(
                inner.points(segment)?,
                *missing,
            ))),
            Geo::Empty => Ok(Box::new(EmptyGeoPointValues)),
        }
    }
}

impl fmt::Debug for Geo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geo::FieldData(_) => f.write_str("Geo::FieldData"),
            Geo::WithMissing { inner, missing } => {
                write!(f, "Geo::WithMissing({inner:?}, {missing:?})")
            }
            Geo::Empty => f.write_str("Geo::Empty"),
        }
    }
}

struct EmptyGeoPointValues;

impl GeoPointValues for EmptyGeoPointValues {
    fn get_vals(&mut self, _doc: DocId, vals: &mut Vec<GeoPoint>) -> std::io::Result<()> {
        vals.clear();
        Ok(())
    }
}
