use pretty_assertions::assert_eq;
use trestle_core::config::HarnessConfig;
use trestle_e2e::util::harness::runner;
use trestle_harness::{
    setup::{database_property_decorator, database_property_decorator_no_teardown, props},
    Fixture, Suite,
};

const PROPERTY: &str = "trestle.e2e.mode";

fn expect_property(name: &str, expected: Option<&'static str>) -> Fixture {
    Fixture::new(name, move |ctx| {
        let actual = ctx
            .open_default_connection()?
            .get_database_property(PROPERTY)?;
        assert_eq!(actual.as_deref(), expected);
        Ok(())
    })
}

#[test]
fn test_nested_property_decorators_restore_previous_values() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());

    let node = database_property_decorator(
        Suite::new("s")
            .add(database_property_decorator(
                expect_property("inner", Some("inner")),
                props([(PROPERTY, "inner")]),
            ))
            .add(expect_property("outer", Some("outer"))),
        props([(PROPERTY, "outer")]),
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(engine.database("wombat").unwrap().property(PROPERTY), None);
}

#[test]
fn test_property_decorator_no_teardown_leaves_value() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());

    let node = database_property_decorator_no_teardown(
        expect_property("f", Some("kept")),
        props([(PROPERTY, "kept")]),
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(
        engine.database("wombat").unwrap().property(PROPERTY),
        Some("kept")
    );
}
