use pretty_assertions::assert_eq;
use trestle_connectors_base::interface::NetworkServer;
use trestle_core::config::HarnessConfig;
use trestle_e2e::util::{events::Events, harness::runner};
use trestle_harness::{setup::client_server_decorator, suites::existing_server_suite, FailureKind};

fn conf() -> HarnessConfig {
    HarnessConfig {
        server_wait_time_ms: 200,
        ..HarnessConfig::default()
    }
}

#[test]
fn test_occupied_port_fails_setup() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&conf());
    let events = Events::new();
    engine.occupy_port("localhost", 1527);

    let report = runner
        .run(&client_server_decorator(events.fixture("never_runs")))
        .unwrap();

    assert!(events.get().is_empty());
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Setup);
    assert_eq!(failures[0].path, "client_server");
    assert!(failures[0].cause.contains("to become free"), "{}", failures[0].cause);
}

#[test]
fn test_unresponsive_server_fails_setup() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&conf());
    let events = Events::new();
    engine.set_unresponsive(true);

    let report = runner
        .run(&client_server_decorator(events.fixture("never_runs")))
        .unwrap();

    assert!(events.get().is_empty());
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].cause.contains("to start"), "{}", failures[0].cause);

    // the server which did start is still stopped
    engine.set_unresponsive(false);
    assert!(!engine.ping("localhost", 1527));
}

#[test]
fn test_existing_server_is_left_running() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&conf());
    let events = Events::new();
    engine.start("localhost", 1650).unwrap();

    let report = runner
        .run(&existing_server_suite(
            "s",
            events.fixture("uses_server"),
            true,
            "localhost",
            1650,
        ))
        .unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(events.get(), vec!["uses_server"]);
    assert!(engine.ping("localhost", 1650));
}
