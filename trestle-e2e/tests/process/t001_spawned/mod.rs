use pretty_assertions::assert_eq;
use trestle_core::config::HarnessConfig;
use trestle_e2e::util::harness::runner;
use trestle_harness::{
    process::spawned_fixture, setup::single_use_database_decorator_with_name, FailureKind, Suite,
};

#[test]
fn test_spawned_fixture_receives_configuration() {
    trestle_logging::init_for_tests();
    let (_, runner) = runner(&HarnessConfig::default());

    let node = single_use_database_decorator_with_name(
        Suite::new("s")
            .add(spawned_fixture(
                "sees_fixture_name",
                "sh",
                ["-c", "test \"$TRESTLE_SPAWNED_FIXTURE\" = sees_fixture_name"],
            ))
            .add(spawned_fixture(
                "sees_database",
                "sh",
                ["-c", "case \"$TRESTLE_CONFIGURATION\" in *spawndb*) exit 0;; *) exit 1;; esac"],
            )),
        "spawndb",
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(report.fixtures_run(), 2);
}

#[test]
fn test_spawned_fixture_failure_carries_stderr() {
    trestle_logging::init_for_tests();
    let (_, runner) = runner(&HarnessConfig::default());

    let report = runner
        .run(&spawned_fixture("fails", "sh", ["-c", "echo boom >&2; exit 3"]).into())
        .unwrap();

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Assertion);
    assert!(failures[0].cause.contains("boom"), "{}", failures[0].cause);
}

#[test]
fn test_spawned_fixture_missing_program() {
    trestle_logging::init_for_tests();
    let (_, runner) = runner(&HarnessConfig::default());

    let report = runner
        .run(&spawned_fixture("missing", "/nonexistent/trestle-child", Vec::<String>::new()).into())
        .unwrap();

    assert_eq!(report.failures().len(), 1);
    assert!(report.failures()[0].cause.contains("Failed to launch"));
}
