//! Read-only description of one indexed field.

use crate::fielddata::IndexFieldData;
use crate::format::ValueFormat;

/// Metadata and storage handle for one indexed field.
///
/// The field-data handle is borrowed from the index; a `FieldContext` never
/// owns or closes storage.
#[derive(Clone, Debug)]
pub struct FieldContext {
    field: String,
    type_name: String,
    field_data: IndexFieldData,
    format: ValueFormat,
}

impl FieldContext {
    /// `type_name` is the field's mapped type, used only in diagnostics.
    pub fn new<S1, S2>(field: S1, type_name: S2, field_data: IndexFieldData) -> FieldContext
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        FieldContext {
            field: field.into(),
            type_name: type_name.into(),
            field_data,
            format: ValueFormat::default(),
        }
    }

    /// Binds a domain-specific literal format to the field (e.g. a date
    /// field whose textual literals are RFC 3339 timestamps).
    pub fn set_value_format(mut self, format: ValueFormat) -> FieldContext {
        self.format = format;
        self
    }

    /// The field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The field's declared type name, for diagnostics.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The storage-backed accessor handle.
    pub fn field_data(&self) -> &IndexFieldData {
        &self.field_data
    }

    /// The literal format bound to this field.
    pub fn value_format(&self) -> ValueFormat {
        self.format
    }
}
