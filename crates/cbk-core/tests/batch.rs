//! Tests for the batch processor.

use std::io::Cursor;

use cbk_core::{process, process_lines};
use cbk_ingest::LineSource;
use cbk_model::{
    BatchOptions, BatchResult, DataSourceError, Decimal, DecodeOptions, ErrorCategory,
    FieldDefinition, FieldValue, Schema, ShortLinePolicy,
};
use cbk_validate::{Rule, RuleEngine};
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

fn customer_line(id: &str, status: &str, balance: &str, name: &str) -> String {
    format!("{id}{status}{balance}{name:<12}")
}

fn sample_lines() -> Vec<String> {
    vec![
        customer_line("00042", "A", "-000012345", "  John Smith"),
        String::new(),
        customer_line("00043", "X", "+000000100", "Jane Doe"),
        "0004".to_string(),
        customer_line("00044", "R", "-000060000", "Ann Lee"),
        "   ".to_string(),
        customer_line("00O45", "N", "+000000000", "Bob"),
    ]
}

fn run(lines: &[String], options: &BatchOptions) -> BatchResult {
    process_lines(
        &customer_schema(),
        &RuleEngine::reference_rules(),
        lines.iter().map(String::as_str),
        options,
    )
}

#[test]
fn test_end_to_end_customer_line() {
    let schema = Schema::new(vec![
        FieldDefinition::unsigned("customer_id", 0, 5),
        FieldDefinition::code("status_code", 5, 1),
        FieldDefinition::decimal("account_balance", 6, 10, 2),
    ])
    .unwrap();
    let rules = RuleEngine::new().with_rule(Rule::DeriveFlag {
        field: "status_code".into(),
        equals: "A".into(),
        target: "is_active".into(),
    });
    let result = process_lines(&schema, &rules, ["00042A-000012345"], &BatchOptions::default());

    assert!(!result.has_errors());
    let record = &result.records[0];
    assert_eq!(record.get("customer_id"), Some(&FieldValue::Integer(42)));
    assert_eq!(record.get("status_code"), Some(&FieldValue::text("A")));
    assert_eq!(
        record.get("account_balance"),
        Some(&FieldValue::Decimal(Decimal::new(-12345, 2)))
    );
    assert_eq!(record.get("is_active"), Some(&FieldValue::Bool(true)));
}

#[test]
fn test_mixed_batch_keeps_line_numbers() {
    let result = run(&sample_lines(), &BatchOptions::default());

    assert_eq!(result.lines_read, 7);
    assert_eq!(result.blank_lines, 2);
    assert_eq!(result.records.len(), 2);
    assert!(!result.truncated);

    let lines: Vec<usize> = result.errors.iter().map(|e| e.line_number).collect();
    assert_eq!(lines, vec![3, 4, 7]);
    assert_eq!(
        result.errors[0].message,
        "Line 3: Error processing record - Invalid status_code 'X'"
    );
    assert_eq!(result.errors[0].category, ErrorCategory::Validation);
    assert_eq!(
        result.errors[1].message,
        "Line 4: Error processing record - field 'customer_id': line is truncated \
         (28 characters required, 4 present) (raw '0004')"
    );
    assert_eq!(result.errors[1].raw_line, "0004");
    assert_eq!(result.errors[2].category, ErrorCategory::Decode);
    assert!(result.errors[2].message.starts_with("Line 7: Error processing record - "));

    assert_eq!(
        result.records[0].get("customer_name"),
        Some(&FieldValue::text("JOHN SMITH"))
    );
    assert_eq!(result.records[1].get("is_active"), Some(&FieldValue::Bool(false)));

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].line_number, 5);
    assert_eq!(
        result.warnings[0].message,
        "customer_id 44: account_balance -600.00 is below -500.00"
    );
}

#[test]
fn test_counts_add_up() {
    let result = run(&sample_lines(), &BatchOptions::default());
    assert_eq!(
        result.processed_lines(),
        result.lines_read - result.blank_lines
    );
}

#[test]
fn test_rejected_record_never_in_output() {
    let result = run(&sample_lines(), &BatchOptions::default());
    assert!(result.records.iter().all(|record| {
        record.get("status_code") != Some(&FieldValue::text("X"))
    }));
}

#[test]
fn test_error_limit_truncates() {
    let options = BatchOptions::default().with_max_errors(Some(2));
    let result = run(&sample_lines(), &options);

    assert!(result.truncated);
    assert_eq!(result.lines_read, 4);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.blank_lines, 1);
}

#[test]
fn test_zero_error_limit_means_unlimited() {
    let options = BatchOptions::default().with_max_errors(Some(0));
    let result = run(&sample_lines(), &options);
    assert!(!result.truncated);
    assert_eq!(result.errors.len(), 3);
}

#[test]
fn test_pad_option_reaches_decoder() {
    let options = BatchOptions::default()
        .with_decode(DecodeOptions::default().with_short_lines(ShortLinePolicy::Pad));
    let result = run(&["00042A-000012345  John".to_string()], &options);
    assert_eq!(result.records.len(), 1);
    assert_eq!(
        result.records[0].get("customer_name"),
        Some(&FieldValue::text("JOHN"))
    );
}

#[test]
fn test_type_mismatch_is_unexpected() {
    let rules = RuleEngine::new().with_rule(Rule::Uppercase {
        field: "account_balance".into(),
    });
    let line = customer_line("00042", "A", "-000012345", "John");
    let result = process_lines(&customer_schema(), &rules, [line.as_str()], &BatchOptions::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].category, ErrorCategory::Unexpected);
    assert_eq!(
        result.errors[0].message,
        "Line 1: Unexpected error - rule 'uppercase' expected text in field \
         'account_balance', found decimal"
    );
}

#[test]
fn test_line_terminators_are_not_kept() {
    let valid = format!("{}\r\n", customer_line("00042", "A", "-000012345", "John"));
    let lines = ["00042Z\n", "0004X\r\n", "\r\n", valid.as_str()];
    for parallel in [false, true] {
        let options = BatchOptions::default().with_parallel(parallel);
        let result = process_lines(&customer_schema(), &RuleEngine::reference_rules(), lines, &options);

        let raw: Vec<_> = result.errors.iter().map(|e| e.raw_line.as_str()).collect();
        assert_eq!(raw, ["00042Z", "0004X"]);
        assert_eq!(result.blank_lines, 1);
        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.records[0].get("customer_name"),
            Some(&FieldValue::text("JOHN"))
        );
    }
}

#[test]
fn test_line_source_input() {
    let data = sample_lines().join("\r\n");
    let source = LineSource::from_reader(Cursor::new(data));
    let result = process(
        &customer_schema(),
        &RuleEngine::reference_rules(),
        source,
        &BatchOptions::default(),
    )
    .unwrap();
    assert_eq!(result, run(&sample_lines(), &BatchOptions::default()));
}

fn failing_source(good_lines: Vec<String>) -> impl Iterator<Item = Result<String, DataSourceError>> {
    let failed_at = good_lines.len() + 1;
    good_lines
        .into_iter()
        .map(Ok)
        .chain(std::iter::once(Err(DataSourceError::Encoding {
            line_number: failed_at,
        })))
}

#[test]
fn test_source_failure_is_fatal() {
    for parallel in [false, true] {
        let options = BatchOptions::default().with_parallel(parallel);
        let err = process(
            &customer_schema(),
            &RuleEngine::reference_rules(),
            failing_source(sample_lines()),
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, DataSourceError::Encoding { line_number: 8 }));
    }
}

#[test]
fn test_error_limit_reached_before_source_failure() {
    for parallel in [false, true] {
        let options = BatchOptions::default()
            .with_parallel(parallel)
            .with_max_errors(Some(1));
        let result = process(
            &customer_schema(),
            &RuleEngine::reference_rules(),
            failing_source(sample_lines()),
            &options,
        )
        .unwrap();
        assert!(result.truncated);
        assert_eq!(result.lines_read, 3);
    }
}

fn large_input(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 7 {
            0 => String::new(),
            3 => customer_line(&format!("{:05}", i % 100_000), "Z", "+000000000", "Bad Status"),
            5 => format!("{:05}", i % 100_000),
            _ => customer_line(
                &format!("{:05}", i % 100_000),
                ["A", "N", "R"][i % 3],
                &format!("-{:09}", i * 37),
                &format!("name {i}"),
            ),
        })
        .collect()
}

#[test]
fn test_parallel_matches_sequential() {
    let lines = large_input(10_000);
    let sequential = run(&lines, &BatchOptions::default());
    let parallel = run(&lines, &BatchOptions::default().with_parallel(true));
    assert_eq!(parallel, sequential);
    assert!(!sequential.records.is_empty());
    assert!(!sequential.warnings.is_empty());
}

#[test]
fn test_parallel_error_limit_matches_sequential() {
    let lines = large_input(12_000);
    let options = BatchOptions::default().with_max_errors(Some(1_500));
    let sequential = run(&lines, &options);
    let parallel = run(&lines, &options.clone().with_parallel(true));
    assert!(sequential.truncated);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_batch_is_idempotent() {
    let lines = large_input(500);
    assert_eq!(
        run(&lines, &BatchOptions::default()),
        run(&lines, &BatchOptions::default())
    );
}

fn arbitrary_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        Just(customer_line("00001", "A", "+000000001", "Alice")),
        Just(customer_line("00002", "Q", "+000000001", "Quinn")),
        "[0-9A-Z +-]{0,40}",
    ]
}

proptest! {
    #[test]
    fn prop_every_line_is_accounted_for(lines in prop::collection::vec(arbitrary_line(), 0..60)) {
        let result = run(&lines, &BatchOptions::default());
        let blank = lines.iter().filter(|line| line.trim().is_empty()).count();
        prop_assert_eq!(result.lines_read, lines.len());
        prop_assert_eq!(result.blank_lines, blank);
        prop_assert_eq!(result.records.len() + result.errors.len(), lines.len() - blank);
        prop_assert!(result.errors.windows(2).all(|pair| pair[0].line_number < pair[1].line_number));
    }
}
