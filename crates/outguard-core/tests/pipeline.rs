//! End-to-end routing: validation, recovery, handler policy and reporting.

use std::sync::Arc;
use std::thread;

use outguard_core::{ErrorHandler, ErrorMode, ErrorRouter, OutguardConfig, guard};
use outguard_error::{ErrorBuilder, ErrorCode, OutputError, Severity};
use outguard_recovery::{
    DefaultRecoveryHandler, FormatFallbackStrategy, Recovered, RecoveryContext, RetryStrategy,
};
use outguard_report::{ErrorReporter, MemoryLogger};
use outguard_validate::{Table, Value};
use proptest::prelude::*;

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
        Just(Severity::Fatal),
    ]
}

fn reporter() -> Arc<ErrorReporter> {
    Arc::new(ErrorReporter::new(Arc::new(MemoryLogger::new())))
}

proptest! {
    #[test]
    fn strict_surfaces_exactly_error_and_above(sev in severity()) {
        let handler = ErrorHandler::strict();
        let result = handler.handle(OutputError::new(ErrorCode::TRANSFORMATION, sev, "x"));
        prop_assert_eq!(result.is_err(), sev >= Severity::Error);
    }

    #[test]
    fn lenient_collects_everything_and_surfaces_only_fatal(sevs in proptest::collection::vec(severity(), 1..20)) {
        let handler = ErrorHandler::lenient();
        for sev in &sevs {
            let result = handler.handle(OutputError::new(ErrorCode::TRANSFORMATION, *sev, "x"));
            prop_assert_eq!(result.is_err(), *sev == Severity::Fatal);
        }
        let collected: Vec<Severity> = handler
            .get_collected_errors()
            .iter()
            .map(OutputError::severity)
            .collect();
        prop_assert_eq!(collected, sevs);
    }
}

#[test]
fn recovered_errors_skip_the_handler_but_are_reported() {
    let handler = Arc::new(ErrorHandler::lenient());
    let reporter = reporter();
    let router = ErrorRouter::new(Arc::clone(&handler))
        .with_recovery(DefaultRecoveryHandler::new().with(FormatFallbackStrategy::new(["xlsx", "csv"])))
        .with_reporter(Arc::clone(&reporter));

    let recovery = router
        .route(
            OutputError::validation(ErrorCode::INVALID_FORMAT, "xlsx writer unavailable"),
            &RecoveryContext::new().with_format("xlsx"),
        )
        .unwrap();

    assert_eq!(recovery.map(|r| r.result), Some(Recovered::Format("csv".to_string())));
    assert!(!handler.has_errors());
    assert_eq!(reporter.len(), 1);
}

#[test]
fn failed_recovery_falls_through_to_handler() {
    let handler = Arc::new(ErrorHandler::strict());
    let router = ErrorRouter::new(Arc::clone(&handler))
        .with_recovery(DefaultRecoveryHandler::new().with(FormatFallbackStrategy::new(["csv"])));

    let err = router
        .route(
            OutputError::validation(ErrorCode::INVALID_FORMAT, "csv rejected"),
            &RecoveryContext::new().with_format("csv"),
        )
        .unwrap_err();
    assert_eq!(err.code(), &ErrorCode::INVALID_FORMAT);
    assert_eq!(err.message(), "csv rejected");
}

#[test]
fn failed_recovery_keeps_the_original_severity() {
    let handler = Arc::new(ErrorHandler::strict());
    let reporter = reporter();
    let router = ErrorRouter::new(Arc::clone(&handler))
        .with_recovery(
            DefaultRecoveryHandler::new()
                .with(RetryStrategy::default())
                .with(FormatFallbackStrategy::new(["csv"])),
        )
        .with_reporter(Arc::clone(&reporter));

    // Retry has no operation to re-invoke.
    let timeout = ErrorBuilder::new(ErrorCode::NETWORK_TIMEOUT, "slow upstream")
        .with_severity(Severity::Warning)
        .build_processing(true);
    assert_eq!(router.route(timeout, &RecoveryContext::new()), Ok(None));

    // The fallback list is exhausted.
    let format = ErrorBuilder::new(ErrorCode::INVALID_FORMAT, "csv quirks")
        .with_severity(Severity::Warning)
        .build_validation();
    assert_eq!(
        router.route(format, &RecoveryContext::new().with_format("csv")),
        Ok(None)
    );

    let codes: Vec<String> = reporter
        .history()
        .iter()
        .map(|r| r.error.code().to_string())
        .collect();
    assert_eq!(codes, vec!["OUT-4001", "OUT-1001"]);
}

#[test]
fn fatal_errors_are_never_recovered() {
    let handler = Arc::new(ErrorHandler::lenient());
    let router = ErrorRouter::new(Arc::clone(&handler))
        .with_recovery(DefaultRecoveryHandler::new().with(FormatFallbackStrategy::new(["csv"])));
    let fatal = ErrorBuilder::new(ErrorCode::INVALID_FORMAT, "renderer crashed")
        .with_severity(Severity::Fatal)
        .build();

    assert_eq!(router.route(fatal.clone(), &RecoveryContext::new()), Err(fatal));
    assert!(handler.has_errors_with_severity(Severity::Fatal));
}

#[test]
fn configured_pipeline_collects_each_validation_failure() {
    let config = OutguardConfig::from_toml_str(
        r#"
        [handler]
        mode = "lenient"

        [validation]
        mode = "collect_all"
        required_columns = ["Id", "Amount", "Email"]
        column_types = { Id = "int" }
        positive = ["Amount"]
        "#,
    )
    .unwrap();

    let handler = Arc::new(config.error_handler());
    let reporter = reporter();
    let router = ErrorRouter::new(Arc::clone(&handler)).with_reporter(Arc::clone(&reporter));
    let runner = config.validation_runner().unwrap();

    let mut table = Table::new(["Id", "Amount"]);
    table.push([("Id", Value::from("A-1")), ("Amount", Value::from(-5))]);

    let recoveries = router.validate_and_route(&runner, &table, None).unwrap();
    assert!(recoveries.is_empty());

    let summary = handler.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.by_code["OUT-2001"], 1);
    assert_eq!(summary.by_code["OUT-2002"], 1);
    assert_eq!(summary.by_code["OUT-2003"], 1);
    assert_eq!(reporter.len(), 3);
    assert_eq!(handler.mode(), ErrorMode::Lenient);
}

#[test]
fn strict_pipeline_stops_at_first_surfaced_error() {
    let handler = Arc::new(ErrorHandler::strict());
    let router = ErrorRouter::new(Arc::clone(&handler));
    let runner = OutguardConfig::default().validation_runner().unwrap();

    let err = router
        .validate_and_route(&runner, &Table::new(["Id"]), None)
        .unwrap_err();
    assert_eq!(err.code(), &ErrorCode::EMPTY_DATASET);
}

#[test]
fn handler_keeps_every_concurrent_error() {
    let handler = Arc::new(ErrorHandler::lenient());
    let workers: Vec<_> = (0..6)
        .map(|worker| {
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                for i in 0..50 {
                    let err = OutputError::new(
                        ErrorCode::TRANSFORMATION,
                        Severity::Warning,
                        format!("worker {worker} item {i}"),
                    );
                    handler.handle(err).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let summary = handler.summary();
    assert_eq!(summary.total, 300);
    assert_eq!(summary.fixable, 300);
}

#[test]
fn guarded_panic_is_routed_as_fatal() {
    let handler = Arc::new(ErrorHandler::lenient());
    let router = ErrorRouter::new(Arc::clone(&handler));

    let outcome = guard("render_markdown", || -> Result<(), OutputError> {
        let rows: Vec<u32> = Vec::new();
        let _ = rows[3];
        Ok(())
    });
    let err = router.route(outcome.unwrap_err(), &RecoveryContext::new()).unwrap_err();
    assert_eq!(err.severity(), Severity::Fatal);
    assert_eq!(err.code(), &ErrorCode::UNEXPECTED);
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outguard.toml");
    std::fs::write(
        &path,
        "[monitoring]\nservice_name = \"exports\"\nthreshold = { min_severity = \"error\", window_secs = 60 }\n",
    )
    .unwrap();

    let config = OutguardConfig::load(&path).unwrap();
    assert_eq!(config.monitoring.service_name, "exports");
    let threshold = config.alert_threshold();
    assert_eq!(threshold.min_severity, Some(Severity::Error));
    assert_eq!(threshold.window, Some(std::time::Duration::from_secs(60)));

    let round_trip = OutguardConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
    assert_eq!(round_trip, config);

    let missing = OutguardConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(
        missing.suggestion(),
        "Check that the config path exists and is readable"
    );
}

#[test]
fn lenient_summary_deduplicates_suggestions() {
    let handler = ErrorHandler::lenient();
    let missing = || {
        ErrorBuilder::new(ErrorCode::MISSING_COLUMN, "missing Email")
            .with_severity(Severity::Warning)
            .with_suggestions(["Add column 'Email' to the table"])
            .build()
    };
    handler.handle(missing()).unwrap();
    handler
        .handle(OutputError::validation(ErrorCode::INVALID_DATA_TYPE, "Qty is text"))
        .unwrap();
    handler.handle(missing()).unwrap();

    insta::assert_json_snapshot!(handler.summary(), @r#"
    {
      "total": 3,
      "by_code": {
        "OUT-2001": 2,
        "OUT-2002": 1
      },
      "by_severity": {
        "warning": 2,
        "error": 1
      },
      "suggestions": [
        "Add column 'Email' to the table"
      ],
      "fixable": 2
    }
    "#);
}
