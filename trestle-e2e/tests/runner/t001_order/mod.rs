use pretty_assertions::assert_eq;
use trestle_e2e::{current_dir, util::events::Events, util::harness::run_with_config};
use trestle_harness::{NodeState, Suite};

#[test]
fn test_decorators_bracket_their_subtree() {
    trestle_logging::init_for_tests();
    let events = Events::new();

    let (_, report) = run_with_config(current_dir!().join("config.yml"), |_| {
        events
            .decorator(
                "outer",
                Suite::new("suite")
                    .add(events.fixture("a"))
                    .add(events.decorator("inner", events.fixture("b")))
                    .add(events.fixture("c")),
            )
            .into()
    });

    assert!(report.is_success(), "{}", report);
    assert_eq!(
        events.get(),
        vec![
            "outer.before",
            "a",
            "inner.before",
            "b",
            "inner.after",
            "c",
            "outer.after"
        ]
    );
    assert_eq!(
        report.fixture_paths(),
        vec![
            "outer/suite/a",
            "outer/suite/inner/b",
            "outer/suite/c"
        ]
    );
}

#[test]
fn test_fixtures_see_the_configured_database() {
    trestle_logging::init_for_tests();

    let (engine, report) = run_with_config(current_dir!().join("config.yml"), |_| {
        trestle_harness::Fixture::new("connect", |ctx| {
            assert_eq!(ctx.configuration().default_db_name(), "orderdb");
            assert_eq!(ctx.ambient().unwrap(), ctx.configuration().clone());
            ctx.open_default_connection()?;
            Ok(())
        })
        .into()
    });

    assert!(report.is_success(), "{}", report);
    assert_eq!(report.record("connect").unwrap().state, NodeState::Passed);
    assert!(engine.database("orderdb").is_some());
}
