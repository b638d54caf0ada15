//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT block a thread to wait.
//! **Required**: Cadence and lifecycle delays go through `tokio::time`, so
//! they stay cancellable and run on a paused clock in tests.

use architectural_enforcement::{scan, PRODUCTION_DIRS};

#[test]
fn test_no_thread_sleep_in_production_code() {
    let violations = scan(PRODUCTION_DIRS, |code| {
        code.contains("thread::sleep") || code.contains("std::thread::park_timeout")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking sleeps found in production code:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::time::sleep / interval instead.");

        panic!(
            "\nFound {} blocking sleep violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_no_blocking_waits_in_async_core() {
    let violations = scan(&["rotor/core/src"], |code| {
        code.contains("block_on(") || code.contains("std::sync::mpsc")
    });

    assert!(
        violations.is_empty(),
        "blocking waits in core: {violations:#?}"
    );
}
