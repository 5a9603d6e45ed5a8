//! Data model for fixed-width record processing.
//!
//! - **schema**: layout configuration and the validated [`Schema`]
//! - **value** / **record**: typed values, decoded records, per-line outcomes
//! - **error**: fatal (schema, data source) and per-line (decode) errors
//! - **options**: decoder and batch configuration

pub mod error;
pub mod options;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{DataSourceError, DecodeError, DecodeErrorKind, NumericFault, SchemaError};
pub use options::{BatchOptions, DecodeOptions, ShortLinePolicy, TrimPolicy};
pub use record::{BatchResult, DecodedRecord, ErrorCategory, ProcessingError, RecordWarning};
pub use schema::{
    FieldDefinition, FieldKind, FieldOverlap, LayoutConfig, LayoutField, MAX_SCALE, Schema,
    SchemaOptions, UnknownKindPolicy,
};
pub use value::FieldValue;

pub use rust_decimal::Decimal;
