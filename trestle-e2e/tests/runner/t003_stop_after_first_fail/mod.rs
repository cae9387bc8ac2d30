use pretty_assertions::assert_eq;
use trestle_e2e::{current_dir, util::events::Events, util::harness::run_with_config};
use trestle_harness::Suite;

#[test]
fn test_stop_after_first_fail() {
    trestle_logging::init_for_tests();
    let events = Events::new();

    let (_, report) = run_with_config(current_dir!().join("config.yml"), |_| {
        Suite::new("s")
            .add(events.decorator(
                "outer",
                Suite::new("inner")
                    .add(events.failing_fixture("a"))
                    .add(events.fixture("b")),
            ))
            .add(events.decorator("next", events.fixture("c")))
            .into()
    });

    // the entered decorator is still torn down
    assert_eq!(events.get(), vec!["outer.before", "a", "outer.after"]);
    assert_eq!(report.fixture_paths(), vec!["s/outer/inner/a"]);
    assert_eq!(report.failures().len(), 1);
}
