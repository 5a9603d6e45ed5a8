//! Field layouts for fixed-width records.
//!
//! A layout arrives from an external loader as a [`LayoutConfig`] (plain,
//! loosely-typed data that mirrors the JSON layout file). [`Schema::from_layout`]
//! validates it once and produces the immutable [`Schema`] that every decode
//! call shares.
//!
//! # Example
//!
//! ```
//! use cbk_model::{LayoutConfig, LayoutField, Schema, SchemaOptions};
//!
//! let layout = LayoutConfig {
//!     record_length: None,
//!     fields: vec![
//!         LayoutField::new("customer_id", 0, 5, "unsigned-integer"),
//!         LayoutField::new("status_code", 5, 1, "code"),
//!         LayoutField::new("account_balance", 6, 10, "signed-decimal").with_scale(2),
//!     ],
//! };
//! let schema = Schema::from_layout(&layout, &SchemaOptions::default()).unwrap();
//! assert_eq!(schema.required_length(), 16);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Largest number of fractional digits an exact decimal can carry.
pub const MAX_SCALE: u32 = 28;

/// One field entry as written in a layout file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutField {
    pub name: String,
    /// 0-based start offset. Signed so that bad layouts surface as
    /// [`SchemaError::NegativeOffset`] instead of a deserialization failure.
    pub start: i64,
    pub length: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
}

impl LayoutField {
    pub fn new(name: impl Into<String>, start: i64, length: i64, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start,
            length,
            kind: kind.into(),
            scale: None,
        }
    }

    pub fn with_scale(mut self, scale: i64) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// Deserialized layout description, prior to validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Declared record width. When present, no field may extend past it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_length: Option<usize>,
    pub fields: Vec<LayoutField>,
}

/// How [`Schema::from_layout`] treats field types it does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownKindPolicy {
    /// Fail schema construction.
    #[default]
    Reject,
    /// Keep the field as [`FieldKind::Unsupported`]; every line then fails
    /// to decode with an unknown-field-kind error.
    Defer,
}

/// Options for schema construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaOptions {
    pub unknown_kinds: UnknownKindPolicy,
}

impl SchemaOptions {
    pub fn with_unknown_kinds(mut self, policy: UnknownKindPolicy) -> Self {
        self.unknown_kinds = policy;
        self
    }
}

/// Field type after validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text, trimmed per the decoder's trim policy.
    Text,
    /// Optionally signed number with an implied decimal point.
    SignedDecimal,
    /// Non-negative whole number.
    UnsignedInteger,
    /// Fixed code compared by exact value; only trailing blanks are dropped.
    Code,
    /// A kind name the decoder has no coercion for.
    Unsupported(String),
}

impl FieldKind {
    /// Parse a layout type name. Case-insensitive; `-`, `_` and spaces are ignored.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "text" | "string" | "alpha" | "alphanumeric" => Some(Self::Text),
            "signeddecimal" | "decimal" | "numeric" => Some(Self::SignedDecimal),
            "unsignedinteger" | "integer" | "int" | "unsigned" => Some(Self::UnsignedInteger),
            "code" => Some(Self::Code),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::SignedDecimal => "signed-decimal",
            Self::UnsignedInteger => "unsigned-integer",
            Self::Code => "code",
            Self::Unsupported(name) => name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::SignedDecimal | Self::UnsignedInteger)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated field: the character range `[start, start + length)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub start: usize,
    pub length: usize,
    pub kind: FieldKind,
    /// Implied fractional digits; always 0 for non-decimal kinds.
    pub scale: u32,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, start: usize, length: usize, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            start,
            length,
            kind,
            scale: 0,
        }
    }

    pub fn text(name: impl Into<String>, start: usize, length: usize) -> Self {
        Self::new(name, start, length, FieldKind::Text)
    }

    pub fn code(name: impl Into<String>, start: usize, length: usize) -> Self {
        Self::new(name, start, length, FieldKind::Code)
    }

    pub fn unsigned(name: impl Into<String>, start: usize, length: usize) -> Self {
        Self::new(name, start, length, FieldKind::UnsignedInteger)
    }

    pub fn decimal(name: impl Into<String>, start: usize, length: usize, scale: u32) -> Self {
        Self {
            scale,
            ..Self::new(name, start, length, FieldKind::SignedDecimal)
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Two fields whose character ranges intersect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOverlap {
    pub first: String,
    pub second: String,
    /// Shared range, `[start, end)`.
    pub start: usize,
    pub end: usize,
}

/// Validated, ordered field layout. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDefinition>,
    record_length: Option<usize>,
}

impl Schema {
    /// Build a schema from already-typed field definitions.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        Self::with_record_length(fields, None)
    }

    /// Build a schema whose fields must all fit within `record_length`.
    pub fn with_record_length(
        fields: Vec<FieldDefinition>,
        record_length: Option<usize>,
    ) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyLayout);
        }
        let mut seen = BTreeSet::new();
        for (index, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName { index });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
            if field.length == 0 {
                return Err(SchemaError::InvalidLength {
                    field: field.name.clone(),
                    length: 0,
                });
            }
            match field.kind {
                FieldKind::SignedDecimal if field.scale > MAX_SCALE => {
                    return Err(SchemaError::ScaleOutOfRange {
                        field: field.name.clone(),
                        scale: i64::from(field.scale),
                    });
                }
                FieldKind::Text | FieldKind::Code | FieldKind::UnsignedInteger
                    if field.scale > 0 =>
                {
                    return Err(SchemaError::ScaleNotApplicable {
                        field: field.name.clone(),
                        kind: field.kind.to_string(),
                    });
                }
                _ => {}
            }
            if let Some(limit) = record_length
                && field.end() > limit
            {
                return Err(SchemaError::FieldBeyondRecord {
                    field: field.name.clone(),
                    end: field.end(),
                    record_length: limit,
                });
            }
        }
        Ok(Self {
            fields,
            record_length,
        })
    }

    /// Validate a deserialized layout.
    pub fn from_layout(layout: &LayoutConfig, options: &SchemaOptions) -> Result<Self, SchemaError> {
        let mut fields = Vec::with_capacity(layout.fields.len());
        for (index, entry) in layout.fields.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName { index });
            }
            let start = usize::try_from(entry.start).map_err(|_| SchemaError::NegativeOffset {
                field: entry.name.clone(),
                start: entry.start,
            })?;
            let length = usize::try_from(entry.length)
                .ok()
                .filter(|length| *length > 0)
                .ok_or_else(|| SchemaError::InvalidLength {
                    field: entry.name.clone(),
                    length: entry.length,
                })?;
            let kind = match FieldKind::parse(&entry.kind) {
                Some(kind) => kind,
                None => match options.unknown_kinds {
                    UnknownKindPolicy::Reject => {
                        return Err(SchemaError::UnknownKind {
                            field: entry.name.clone(),
                            kind: entry.kind.clone(),
                        });
                    }
                    UnknownKindPolicy::Defer => FieldKind::Unsupported(entry.kind.clone()),
                },
            };
            let scale = resolve_scale(&entry.name, &kind, entry.scale)?;
            fields.push(FieldDefinition {
                name: entry.name.clone(),
                start,
                length,
                kind,
                scale,
            });
        }
        Self::with_record_length(fields, layout.record_length)
    }

    /// Fields in declared order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn record_length(&self) -> Option<usize> {
        self.record_length
    }

    /// Minimum line length (in characters) that covers every field.
    pub fn required_length(&self) -> usize {
        self.fields
            .iter()
            .map(FieldDefinition::end)
            .max()
            .unwrap_or(0)
    }

    /// Every pair of fields whose ranges intersect, in declaration order.
    pub fn overlaps(&self) -> Vec<FieldOverlap> {
        let mut overlaps = Vec::new();
        for (i, first) in self.fields.iter().enumerate() {
            for second in &self.fields[i + 1..] {
                let start = first.start.max(second.start);
                let end = first.end().min(second.end());
                if start < end {
                    overlaps.push(FieldOverlap {
                        first: first.name.clone(),
                        second: second.name.clone(),
                        start,
                        end,
                    });
                }
            }
        }
        overlaps
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a FieldDefinition;
    type IntoIter = std::slice::Iter<'a, FieldDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn resolve_scale(name: &str, kind: &FieldKind, scale: Option<i64>) -> Result<u32, SchemaError> {
    let checked = |value: i64| {
        u32::try_from(value)
            .ok()
            .filter(|scale| *scale <= MAX_SCALE)
            .ok_or_else(|| SchemaError::ScaleOutOfRange {
                field: name.to_string(),
                scale: value,
            })
    };
    match (kind, scale) {
        (FieldKind::SignedDecimal, None) => Err(SchemaError::MissingScale {
            field: name.to_string(),
        }),
        (FieldKind::SignedDecimal, Some(value)) => checked(value),
        (FieldKind::Unsupported(_), Some(value)) => checked(value),
        (_, None) => Ok(0),
        (_, Some(value)) => match checked(value)? {
            0 => Ok(0),
            _ => Err(SchemaError::ScaleNotApplicable {
                field: name.to_string(),
                kind: kind.to_string(),
            }),
        },
    }
}
