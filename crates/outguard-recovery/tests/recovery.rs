//! Recovery handler behaviour with realistic strategy mixes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use outguard_error::{ErrorBuilder, ErrorCode, OutputError};
use outguard_recovery::{
    CompositeStrategy, DefaultRecoveryHandler, DefaultValueStrategy, ExponentialBackoff,
    FormatFallbackStrategy, RecordingSleeper, Recovered, RecoveryContext, RecoveryStrategy,
    RetryStrategy,
};
use proptest::prelude::*;
use serde_json::json;

fn handler() -> DefaultRecoveryHandler {
    DefaultRecoveryHandler::new()
        .with(RetryStrategy::new(ExponentialBackoff::from_millis(100, 5_000, 3)))
        .with(FormatFallbackStrategy::new(["xlsx", "csv", "json"]))
        .with(DefaultValueStrategy::new().with_default("Currency", "EUR"))
}

#[test]
fn handler_routes_each_error_class_to_its_strategy() {
    let handler = handler();
    let sleeper = Arc::new(RecordingSleeper::new());
    let ctx = RecoveryContext::new()
        .with_format("xlsx")
        .with_sleeper(sleeper.clone())
        .with_operation(|attempt| Ok(json!({ "rows": 10, "attempt": attempt })));

    let format = OutputError::validation(ErrorCode::INVALID_FORMAT, "xlsx rejected");
    assert_eq!(
        handler.recover(&format, &ctx).map(|r| r.result),
        Ok(Recovered::Format("csv".to_string()))
    );

    let missing = ErrorBuilder::new(ErrorCode::MISSING_REQUIRED, "currency missing")
        .with_field("Currency")
        .build();
    assert_eq!(handler.recover(&missing, &ctx).unwrap().strategy, "default_value");

    let timeout = OutputError::processing(ErrorCode::NETWORK_TIMEOUT, "timed out", true);
    let recovery = handler.recover(&timeout, &ctx).unwrap();
    assert_eq!(recovery.strategy, "retry");
    assert_eq!(recovery.result, Recovered::Output(json!({ "rows": 10, "attempt": 1 })));
    assert!(sleeper.sleeps().is_empty());
}

#[test]
fn concurrent_retries_keep_their_own_attempt_counts() {
    let strategy = Arc::new(RetryStrategy::new(ExponentialBackoff::from_millis(1, 4, 4)));
    let error = OutputError::processing(ErrorCode::SERVICE_UNAVAILABLE, "busy", true);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let strategy = Arc::clone(&strategy);
            let error = error.clone();
            thread::spawn(move || {
                let calls = Arc::new(AtomicU32::new(0));
                let counter = Arc::clone(&calls);
                let sleeper = Arc::new(RecordingSleeper::new());
                let ctx = RecoveryContext::new()
                    .with_sleeper(sleeper.clone())
                    .with_operation(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(OutputError::processing(ErrorCode::SERVICE_UNAVAILABLE, "busy", true))
                    });
                let result = strategy.apply(&error, &ctx);
                (result.is_err(), calls.load(Ordering::SeqCst), sleeper.sleeps().len())
            })
        })
        .collect();

    for worker in workers {
        let (failed, calls, sleeps) = worker.join().unwrap();
        assert!(failed);
        assert_eq!(calls, 4);
        assert_eq!(sleeps, 3);
    }
}

#[test]
fn composite_inside_handler_is_ranked_by_its_priority() {
    let handler = DefaultRecoveryHandler::new()
        .with(FormatFallbackStrategy::new(["pdf"]))
        .with(
            CompositeStrategy::new("fallbacks")
                .with(FormatFallbackStrategy::new(["json"]))
                .with_priority(1),
        );
    assert_eq!(handler.strategy_names(), vec!["fallbacks", "format_fallback"]);

    let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "csv rejected");
    let recovery = handler
        .recover(&err, &RecoveryContext::new().with_format("csv"))
        .unwrap();
    assert_eq!(recovery.strategy, "fallbacks");
    assert_eq!(recovery.result, Recovered::Format("json".to_string()));
}

proptest! {
    #[test]
    fn always_failing_retry_makes_exactly_max_attempts(
        attempts in 1u32..8,
        base in 1u64..500,
    ) {
        let backoff = ExponentialBackoff::from_millis(base, 5_000, attempts);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let sleeper = Arc::new(RecordingSleeper::new());
        let ctx = RecoveryContext::new()
            .with_sleeper(sleeper.clone())
            .with_operation(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(OutputError::processing(ErrorCode::NETWORK_TIMEOUT, "timeout", true))
            });
        let err = OutputError::processing(ErrorCode::NETWORK_TIMEOUT, "timeout", true);

        prop_assert!(RetryStrategy::new(backoff).apply(&err, &ctx).is_err());
        prop_assert_eq!(calls.load(Ordering::SeqCst), attempts);
        let expected: Vec<Duration> = backoff.schedule().collect();
        prop_assert_eq!(sleeper.sleeps(), expected);
    }
}
