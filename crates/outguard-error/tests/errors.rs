//! Integration tests for the error model.

use outguard_error::{
    ErrorBuilder, ErrorCode, ErrorContext, OutputError, Severity, ValidationErrorBuilder,
    Violation, wrap_error,
};
use proptest::prelude::*;
use serde_json::Value;

fn missing_columns_error() -> OutputError {
    ValidationErrorBuilder::new(ErrorCode::MISSING_COLUMN, "missing required columns: Email, Phone")
        .with_field("columns")
        .with_operation("validate")
        .with_violation(Violation::new("Email", Value::Null, "required", "column is missing"))
        .with_violation(Violation::new("Phone", Value::Null, "required", "column is missing"))
        .with_suggestions(["Add column 'Email' to the table", "Add column 'Phone' to the table"])
        .build()
}

#[test]
fn test_error_text_is_stable() {
    insta::assert_snapshot!(missing_columns_error().to_string(), @r"
    [OUT-2001] missing required columns: Email, Phone (field: columns) (operation: validate)
    Suggestions:
      - Add column 'Email' to the table
      - Add column 'Phone' to the table
    ");
}

#[test]
fn test_error_text_with_cause() {
    let err = ErrorBuilder::new(ErrorCode::FILE_WRITE, "could not write report.csv")
        .with_cause(std::io::Error::other("permission denied"))
        .build_processing(false);

    insta::assert_snapshot!(err.to_string(), @r"
    [OUT-3001] could not write report.csv
    Caused by: permission denied
    ");
}

#[test]
fn test_json_uses_lowercase_severity_and_code_string() {
    let json = serde_json::to_value(missing_columns_error()).unwrap();
    assert_eq!(json["code"], "OUT-2001");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["kind"], "validation");
    assert_eq!(json["violations"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["context"]["operation"], "validate");
    assert!(json.get("cause").is_none());
}

#[test]
fn test_composite_json_nests_members() {
    let composite = OutputError::composite(vec![
        missing_columns_error(),
        OutputError::new(ErrorCode::EMPTY_DATASET, Severity::Warning, "no rows"),
    ])
    .unwrap();

    let text = composite.to_json_pretty().unwrap();
    let back: OutputError = serde_json::from_str(&text).unwrap();
    assert_eq!(back.count(), 2);
    assert_eq!(back, composite);
}

fn severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

fn code() -> impl Strategy<Value = ErrorCode> {
    prop::sample::select(ErrorCode::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_severity_order_matches_rank(a in severity(), b in severity()) {
        let rank = |s: Severity| Severity::ALL.iter().position(|x| *x == s).unwrap();
        prop_assert_eq!(a.cmp(&b), rank(a).cmp(&rank(b)));
    }

    #[test]
    fn prop_wrap_is_idempotent(code in code(), sev in severity(), message in "[a-z ]{1,24}") {
        let err = OutputError::new(code, sev, message);
        let once = wrap_error(err.clone());
        let twice = wrap_error(once.clone());
        prop_assert_eq!(&once, &err);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_json_round_trip_keeps_core_fields(
        code in code(),
        sev in severity(),
        message in "[A-Za-z0-9 ]{0,32}",
        field in proptest::option::of("[A-Za-z]{1,8}"),
        index in proptest::option::of(0usize..1000),
    ) {
        let mut context = ErrorContext::new().with_operation("render");
        context.field = field;
        context.index = index;
        let err = OutputError::new(code, sev, message).with_context(context);

        let text = serde_json::to_string(&err).unwrap();
        let back: OutputError = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back.code(), err.code());
        prop_assert_eq!(back.severity(), err.severity());
        prop_assert_eq!(back.message(), err.message());
        prop_assert_eq!(back.context(), err.context());
    }
}
