use pretty_assertions::assert_eq;
use trestle_core::{config::HarnessConfig, err::anyhow};
use trestle_e2e::util::{events::Events, harness::runner};
use trestle_harness::{Decorator, FailureKind, Node, NodeState, Suite};

fn run(node: Node) -> trestle_harness::RunReport {
    let (_, runner) = runner(&HarnessConfig::default());
    let report = runner.run(&node).unwrap();
    assert_eq!(runner.ambient(), None);
    report
}

#[test]
fn test_failing_fixtures_do_not_affect_siblings() {
    trestle_logging::init_for_tests();
    let events = Events::new();

    let report = run(Suite::new("s")
        .add(events.failing_fixture("a"))
        .add(events.panicking_fixture("b"))
        .add(events.fixture("c"))
        .into());

    assert_eq!(events.get(), vec!["a", "b", "c"]);
    assert_eq!(report.fixtures_run(), 3);
    assert_eq!(report.fixtures_passed(), 1);

    let failures = report.failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].path, "s/a");
    assert_eq!(failures[0].kind, FailureKind::Assertion);
    assert_eq!(failures[0].cause, "a failed");
    assert_eq!(failures[1].path, "s/b");
    assert!(failures[1].cause.contains("b panicked"));
    assert_eq!(report.record("s").unwrap().state, NodeState::Failed);
}

#[test]
fn test_failed_setup_skips_subtree_and_still_cleans_up() {
    trestle_logging::init_for_tests();
    let events = Events::new();

    let report = run(Suite::new("s")
        .add(events.failing_decorator("broken", events.fixture("skipped")))
        .add(events.fixture("after_broken"))
        .into());

    assert_eq!(
        events.get(),
        vec!["broken.before", "broken.after", "after_broken"]
    );
    assert_eq!(report.record("s/broken/skipped").map(|r| r.state), None);

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Setup);
    assert_eq!(failures[0].path, "s/broken");
    assert_eq!(
        report.record("s/after_broken").unwrap().state,
        NodeState::Passed
    );
}

#[test]
fn test_cleanup_failure_is_only_recorded_when_nothing_else_failed() {
    trestle_logging::init_for_tests();
    let events = Events::new();

    let failing_cleanup = |name: &str, child: Node| -> Node {
        Decorator::new(name, child)
            .after(|_| Err(anyhow!("cleanup failed")))
            .into()
    };

    let report = run(Suite::new("s")
        .add(failing_cleanup("clean_child", events.fixture("ok").into()))
        .add(failing_cleanup(
            "failed_child",
            events.failing_fixture("bad").into(),
        ))
        .into());

    let failures = report.failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].path, "s/clean_child");
    assert_eq!(failures[0].kind, FailureKind::Cleanup);
    assert_eq!(failures[1].path, "s/failed_child/bad");
    assert_eq!(failures[1].kind, FailureKind::Assertion);
    assert_eq!(
        report.record("s/failed_child").unwrap().state,
        NodeState::Failed
    );
}
