//! Decoded records and per-line outcomes.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::value::FieldValue;

/// Field name to value mapping that keeps insertion order.
///
/// Decoded fields come first in schema order, followed by any fields added by
/// rules in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    entries: Vec<(String, FieldValue)>,
}

impl DecodedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a value. Existing keys keep their position; new keys are appended.
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for DecodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for DecodedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// Which stage rejected a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Decode,
    Validation,
    #[default]
    Unexpected,
}

/// One failed line. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingError {
    /// 1-based position in the source, blank lines included.
    pub line_number: usize,
    #[serde(rename = "error")]
    pub message: String,
    pub raw_line: String,
    #[serde(skip)]
    pub category: ErrorCategory,
}

impl ProcessingError {
    /// Error raised by the decoder or a rule.
    pub fn processing(
        line_number: usize,
        detail: impl std::fmt::Display,
        raw_line: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            line_number,
            message: format!("Line {line_number}: Error processing record - {detail}"),
            raw_line: raw_line.into(),
            category,
        }
    }

    /// Failure nobody anticipated (a panic inside a stage).
    pub fn unexpected(
        line_number: usize,
        detail: impl std::fmt::Display,
        raw_line: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            message: format!("Line {line_number}: Unexpected error - {detail}"),
            raw_line: raw_line.into(),
            category: ErrorCategory::Unexpected,
        }
    }
}

/// Non-fatal notice raised by a rule. The record is still kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWarning {
    pub line_number: usize,
    pub rule: String,
    pub field: String,
    pub message: String,
}

/// Everything one batch run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub records: Vec<DecodedRecord>,
    pub errors: Vec<ProcessingError>,
    pub warnings: Vec<RecordWarning>,
    /// Lines consumed from the source, blank lines included.
    pub lines_read: usize,
    pub blank_lines: usize,
    /// Set when the error limit stopped the batch early.
    pub truncated: bool,
}

impl BatchResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Lines that produced a record or an error.
    pub fn processed_lines(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    pub fn error_count(&self, category: ErrorCategory) -> usize {
        self.errors
            .iter()
            .filter(|error| error.category == category)
            .count()
    }
}
