//! Schema-driven decoding of a single fixed-width line.
//!
//! Offsets are character positions, so multi-byte text never splits a code
//! point. For ASCII input (the common case) they are also byte positions and
//! slicing takes the fast path.
//!
//! # Example
//!
//! ```
//! use cbk_ingest::decode_line;
//! use cbk_model::{DecodeOptions, FieldDefinition, FieldValue, Schema};
//!
//! let schema = Schema::new(vec![
//!     FieldDefinition::unsigned("customer_id", 0, 5),
//!     FieldDefinition::code("status_code", 5, 1),
//!     FieldDefinition::decimal("account_balance", 6, 10, 2),
//! ])
//! .unwrap();
//!
//! let record = decode_line("00042A-000012345", &schema, 1, &DecodeOptions::default()).unwrap();
//! assert_eq!(record.get("customer_id"), Some(&FieldValue::Integer(42)));
//! assert_eq!(record.get("account_balance").unwrap().to_string(), "-123.45");
//! ```

use std::borrow::Cow;

use cbk_model::{
    DecodeError, DecodeErrorKind, DecodeOptions, DecodedRecord, FieldDefinition, FieldKind,
    FieldValue, Schema, ShortLinePolicy,
};

use crate::numeric::{parse_decimal, parse_unsigned};

/// Decode `line` into a record holding every schema field, in schema order.
///
/// Fails on the first field that cannot be decoded; no partial record is
/// returned. With [`ShortLinePolicy::Fail`], a line shorter than
/// [`Schema::required_length`] always fails as a truncated line, whatever
/// its other content.
pub fn decode_line(
    line: &str,
    schema: &Schema,
    line_number: usize,
    options: &DecodeOptions,
) -> Result<DecodedRecord, DecodeError> {
    let content = strip_line_terminator(line);
    let view = LineView::new(content);
    let fail = |field: &FieldDefinition, raw: &str, kind: DecodeErrorKind| DecodeError {
        kind,
        line_number,
        field: field.name.clone(),
        raw: raw.to_string(),
        raw_line: content.to_string(),
    };

    if options.short_lines == ShortLinePolicy::Fail {
        let actual = view.char_len();
        if let Some(field) = schema.iter().find(|field| field.end() > actual) {
            let kind = DecodeErrorKind::TruncatedLine {
                required: schema.required_length(),
                actual,
            };
            return Err(fail(field, view.slice(field.start, field.end()), kind));
        }
    }

    let mut record = DecodedRecord::with_capacity(schema.len());
    for field in schema {
        let raw = view.padded_slice(field.start, field.end());
        let value = coerce(field, &raw, options).map_err(|kind| fail(field, &raw, kind))?;
        record.insert(field.name.clone(), value);
    }
    Ok(record)
}

/// The raw text of `field` within `line`, or `None` when the line is too short.
pub fn raw_slice<'a>(line: &'a str, field: &FieldDefinition) -> Option<&'a str> {
    let view = LineView::new(strip_line_terminator(line));
    (field.end() <= view.char_len()).then(|| view.slice(field.start, field.end()))
}

/// Drop one trailing `\n` or `\r\n`.
pub fn strip_line_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

fn coerce(
    field: &FieldDefinition,
    raw: &str,
    options: &DecodeOptions,
) -> Result<FieldValue, DecodeErrorKind> {
    let invalid = |fault| DecodeErrorKind::InvalidNumeric { fault };
    match &field.kind {
        FieldKind::Text => Ok(FieldValue::text(options.trim.apply(raw))),
        FieldKind::Code => Ok(FieldValue::text(raw.trim_end())),
        FieldKind::SignedDecimal => parse_decimal(raw, field.scale)
            .map(FieldValue::Decimal)
            .map_err(invalid),
        FieldKind::UnsignedInteger => parse_unsigned(raw)
            .map(FieldValue::Integer)
            .map_err(invalid),
        FieldKind::Unsupported(kind) => Err(DecodeErrorKind::UnknownFieldKind { kind: kind.clone() }),
    }
}

/// Character-indexed view over one line.
struct LineView<'a> {
    text: &'a str,
    // Byte offset of every char; `None` when the text is ASCII.
    boundaries: Option<Vec<usize>>,
}

impl<'a> LineView<'a> {
    fn new(text: &'a str) -> Self {
        let boundaries = (!text.is_ascii()).then(|| text.char_indices().map(|(i, _)| i).collect());
        Self { text, boundaries }
    }

    fn char_len(&self) -> usize {
        self.boundaries
            .as_ref()
            .map_or(self.text.len(), Vec::len)
    }

    fn byte_offset(&self, index: usize) -> usize {
        match &self.boundaries {
            None => index.min(self.text.len()),
            Some(boundaries) => boundaries.get(index).copied().unwrap_or(self.text.len()),
        }
    }

    /// `[start, end)` clamped to the line.
    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }

    /// Like [`Self::slice`], but blank-filled to the full width.
    fn padded_slice(&self, start: usize, end: usize) -> Cow<'a, str> {
        let slice = self.slice(start, end);
        let width = end - start;
        let present = self.char_len().min(end).saturating_sub(start);
        if present == width {
            return Cow::Borrowed(slice);
        }
        let mut owned = String::with_capacity(slice.len() + width - present);
        owned.push_str(slice);
        owned.extend(std::iter::repeat_n(' ', width - present));
        Cow::Owned(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators_are_stripped() {
        assert_eq!(strip_line_terminator("abc\r\n"), "abc");
        assert_eq!(strip_line_terminator("abc\n"), "abc");
        assert_eq!(strip_line_terminator("abc"), "abc");
        assert_eq!(strip_line_terminator("abc\r"), "abc\r");
    }

    #[test]
    fn view_slices_by_character() {
        let view = LineView::new("añb€c");
        assert_eq!(view.char_len(), 5);
        assert_eq!(view.slice(1, 4), "ñb€");
        assert_eq!(view.slice(3, 10), "€c");
        assert_eq!(view.slice(7, 9), "");
    }

    #[test]
    fn padded_slice_fills_blanks() {
        let view = LineView::new("abc");
        assert_eq!(view.padded_slice(0, 3), "abc");
        assert_eq!(view.padded_slice(1, 5), "bc  ");
        assert_eq!(view.padded_slice(4, 6), "  ");
    }
}
