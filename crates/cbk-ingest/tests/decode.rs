//! Tests for line decoding.

use cbk_ingest::{decode_line, raw_slice};
use cbk_model::{
    Decimal, DecodeErrorKind, DecodeOptions, FieldDefinition, FieldKind, FieldValue,
    NumericFault, Schema, ShortLinePolicy, TrimPolicy,
};
use proptest::prelude::*;

fn customer_schema() -> Schema {
    Schema::new(vec![
        FieldDefinition::unsigned("customer_id", 0, 5),
        FieldDefinition::code("status_code", 5, 1),
        FieldDefinition::decimal("account_balance", 6, 10, 2),
        FieldDefinition::text("customer_name", 16, 12),
    ])
    .unwrap()
}

fn decode(line: &str) -> Result<cbk_model::DecodedRecord, cbk_model::DecodeError> {
    decode_line(line, &customer_schema(), 1, &DecodeOptions::default())
}

#[test]
fn test_customer_line_decodes() {
    let record = decode("00042A-000012345  John Smith").unwrap();
    assert_eq!(record.get("customer_id"), Some(&FieldValue::Integer(42)));
    assert_eq!(record.get("status_code"), Some(&FieldValue::text("A")));
    assert_eq!(
        record.get("account_balance"),
        Some(&FieldValue::Decimal(Decimal::new(-12345, 2)))
    );
    assert_eq!(record.get("customer_name"), Some(&FieldValue::text("John Smith")));
    let names: Vec<&str> = record.names().collect();
    assert_eq!(
        names,
        vec!["customer_id", "status_code", "account_balance", "customer_name"]
    );
}

#[test]
fn test_implied_scale_renders_exactly() {
    let schema = Schema::new(vec![FieldDefinition::decimal("amount", 0, 8, 2)]).unwrap();
    let record = decode_line("00012345", &schema, 1, &DecodeOptions::default()).unwrap();
    let amount = record.get("amount").unwrap();
    assert_eq!(amount.as_decimal(), Some(Decimal::new(12345, 2)));
    assert_eq!(amount.to_string(), "123.45");
}

#[test]
fn test_empty_text_field_is_kept() {
    let record = decode("00001N+000000000            ").unwrap();
    assert_eq!(record.len(), 4);
    assert_eq!(record.get("customer_name"), Some(&FieldValue::text("")));
    assert_eq!(record.get("account_balance").unwrap().to_string(), "0.00");
}

#[test]
fn test_short_line_fails_as_truncated() {
    let err = decode("00042A-000012345  John").unwrap_err();
    assert_eq!(
        err.kind,
        DecodeErrorKind::TruncatedLine {
            required: 28,
            actual: 22,
        }
    );
    assert_eq!(err.field, "customer_name");
    assert_eq!(err.raw, "  John");
    assert_eq!(err.raw_line, "00042A-000012345  John");
}

#[test]
fn test_truncation_wins_over_bad_content() {
    // The id is also invalid, but a short line is always reported as truncated.
    let err = decode("0X042A").unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(err.field, "account_balance");
}

#[test]
fn test_pad_policy_fills_short_lines() {
    let options = DecodeOptions::default().with_short_lines(ShortLinePolicy::Pad);
    let record =
        decode_line("00042A-000012345  John", &customer_schema(), 3, &options).unwrap();
    assert_eq!(record.get("customer_name"), Some(&FieldValue::text("John")));

    // A numeric field lying entirely past the end becomes blank, which is invalid.
    let err = decode_line("00042A", &customer_schema(), 3, &options).unwrap_err();
    assert_eq!(err.field, "account_balance");
    assert_eq!(
        err.kind,
        DecodeErrorKind::InvalidNumeric {
            fault: NumericFault::Blank
        }
    );
    assert_eq!(err.line_number, 3);
}

#[test]
fn test_invalid_numeric_names_field_and_raw() {
    let err = decode("00O42A-000012345  John Smith").unwrap_err();
    assert_eq!(err.field, "customer_id");
    assert_eq!(err.raw, "00O42");
    assert_eq!(
        err.kind,
        DecodeErrorKind::InvalidNumeric {
            fault: NumericFault::NonDigit('O')
        }
    );
    assert_eq!(
        err.to_string(),
        "field 'customer_id': invalid numeric value: non-digit character 'O' (raw '00O42')"
    );
}

#[test]
fn test_unsigned_field_rejects_negative() {
    let err = decode("-0042A-000012345  John Smith").unwrap_err();
    assert_eq!(
        err.kind,
        DecodeErrorKind::InvalidNumeric {
            fault: NumericFault::NegativeUnsigned
        }
    );
}

#[test]
fn test_right_justified_numbers_accepted() {
    let record = decode("   42A     -1234  John Smith").unwrap();
    assert_eq!(record.get("customer_id"), Some(&FieldValue::Integer(42)));
    assert_eq!(record.get("account_balance").unwrap().to_string(), "-12.34");
}

#[test]
fn test_trim_policies() {
    let schema = Schema::new(vec![FieldDefinition::text("name", 0, 8)]).unwrap();
    let line = "  ab    ";
    let cases = [
        (TrimPolicy::Both, "ab"),
        (TrimPolicy::Leading, "ab    "),
        (TrimPolicy::Trailing, "  ab"),
        (TrimPolicy::None, "  ab    "),
    ];
    for (trim, expected) in cases {
        let options = DecodeOptions::default().with_trim(trim);
        let record = decode_line(line, &schema, 1, &options).unwrap();
        assert_eq!(record.get("name"), Some(&FieldValue::text(expected)), "{trim:?}");
    }
}

#[test]
fn test_code_keeps_leading_blanks() {
    let schema = Schema::new(vec![FieldDefinition::code("code", 0, 3)]).unwrap();
    let record = decode_line(" A ", &schema, 1, &DecodeOptions::default()).unwrap();
    assert_eq!(record.get("code"), Some(&FieldValue::text(" A")));
}

#[test]
fn test_unsupported_kind_fails_every_line() {
    let schema = Schema::new(vec![
        FieldDefinition::text("name", 0, 4),
        FieldDefinition::new("amount", 4, 4, FieldKind::Unsupported("zoned".into())),
    ])
    .unwrap();
    let err = decode_line("ABCD123{", &schema, 9, &DecodeOptions::default()).unwrap_err();
    assert_eq!(
        err.kind,
        DecodeErrorKind::UnknownFieldKind {
            kind: "zoned".to_string()
        }
    );
    assert_eq!(err.field, "amount");
}

#[test]
fn test_crlf_terminator_ignored() {
    let record = decode("00042A-000012345  John Smith\r\n").unwrap();
    assert_eq!(record.get("customer_name"), Some(&FieldValue::text("John Smith")));
}

#[test]
fn test_offsets_are_characters() {
    let schema = Schema::new(vec![
        FieldDefinition::text("city", 0, 6),
        FieldDefinition::unsigned("zip", 6, 5),
    ])
    .unwrap();
    let record = decode_line("Málaga29001", &schema, 1, &DecodeOptions::default()).unwrap();
    assert_eq!(record.get("city"), Some(&FieldValue::text("Málaga")));
    assert_eq!(record.get("zip"), Some(&FieldValue::Integer(29001)));
}

#[test]
fn test_overlapping_fields_read_same_characters() {
    let schema = Schema::new(vec![
        FieldDefinition::text("full", 0, 6),
        FieldDefinition::text("prefix", 0, 3),
    ])
    .unwrap();
    let record = decode_line("ABCDEF", &schema, 1, &DecodeOptions::default()).unwrap();
    assert_eq!(record.get("full"), Some(&FieldValue::text("ABCDEF")));
    assert_eq!(record.get("prefix"), Some(&FieldValue::text("ABC")));
}

fn contiguous_schema(widths: &[usize]) -> Schema {
    let mut start = 0;
    let fields = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let field = FieldDefinition::text(format!("f{i}"), start, *width);
            start += width;
            field
        })
        .collect();
    Schema::new(fields).unwrap()
}

proptest! {
    #[test]
    fn prop_slices_reassemble_line(
        widths in prop::collection::vec(1usize..12, 1..8),
        seed in "[A-Za-z0-9 .,-]{0,100}",
    ) {
        let schema = contiguous_schema(&widths);
        let total = schema.required_length();
        let line: String = seed.chars().cycle().chain(std::iter::repeat(' ')).take(total).collect();

        let rebuilt: String = schema
            .iter()
            .map(|field| raw_slice(&line, field).unwrap())
            .collect();
        prop_assert_eq!(&rebuilt, &line);

        let options = DecodeOptions::default().with_trim(TrimPolicy::None);
        let record = decode_line(&line, &schema, 1, &options).unwrap();
        for field in &schema {
            prop_assert_eq!(
                record.get(&field.name).and_then(FieldValue::as_text),
                raw_slice(&line, field)
            );
        }
    }

    #[test]
    fn prop_decimal_is_exact(mantissa in -99_999_999_999i64..=99_999_999_999, scale in 0u32..=8) {
        let sign = if mantissa < 0 { "-" } else { "+" };
        let raw = format!("{sign}{:012}", mantissa.unsigned_abs());
        let schema = Schema::new(vec![FieldDefinition::decimal("amount", 0, raw.len(), scale)]).unwrap();
        let record = decode_line(&raw, &schema, 1, &DecodeOptions::default()).unwrap();
        let value = record.get("amount").and_then(FieldValue::as_decimal).unwrap();
        prop_assert_eq!(value, Decimal::new(mantissa, scale));
        prop_assert_eq!(value.scale(), scale);
    }

    #[test]
    fn prop_short_lines_never_decode(cut in 0usize..28) {
        let line = "00042A-000012345  John Smith";
        let err = decode(&line[..cut]).unwrap_err();
        prop_assert!(err.is_truncated());
    }
}
