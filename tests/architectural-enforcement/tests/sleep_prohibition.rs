//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT nap on a fixed duration.
//! Blocking `std::thread::sleep` stalls the runtime, and a relative
//! `tokio::time::sleep` drifts away from the engine's timeline.
//! **Required**: wait on the engine's next deadline with `sleep_until`.
//! **Exceptions**: test code

use architectural_enforcement::find_violations;

fn report(title: &str, violations: &[String]) {
    eprintln!("\n❌ CRITICAL: {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!("\n✅ REQUIRED:");
    eprintln!("  - tokio::time::sleep_until(engine deadline) in the driver task");
    eprintln!("  - TypeWriterEngine::advance / advance_to for virtual time");
}

/// Test that production code never blocks a thread with sleep
#[test]
fn test_no_thread_sleep_in_production_code() {
    let violations = find_violations(|code| code.contains("thread::sleep"));

    if !violations.is_empty() {
        report("Blocking sleep calls found in production code!", &violations);
        panic!(
            "\nFound {} blocking sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Test that timing never relies on relative async naps
#[test]
fn test_no_relative_sleep_in_production_code() {
    let violations =
        find_violations(|code| code.contains("::sleep(") || code.contains(".sleep("));

    if !violations.is_empty() {
        report("Relative sleep calls found in production code!", &violations);
        panic!(
            "\nFound {} relative sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}
