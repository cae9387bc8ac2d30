use std::env;

use pretty_assertions::assert_eq;
use serial_test::serial;
use trestle_core::config::HarnessConfig;
use trestle_e2e::util::harness::runner;
use trestle_harness::{
    setup::{props, system_property_decorator},
    Fixture, Suite,
};

const VAR: &str = "TRESTLE_E2E_SYSTEM_PROPERTY";

#[test]
#[serial]
fn test_system_properties_are_restored() {
    trestle_logging::init_for_tests();
    env::set_var(VAR, "original");
    let (_, runner) = runner(&HarnessConfig::default());

    let node = system_property_decorator(
        Suite::new("s").add(Fixture::new("reads_var", |_| {
            assert_eq!(env::var(VAR).unwrap(), "overridden");
            Ok(())
        })),
        props([(VAR, "overridden")]),
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(env::var(VAR).unwrap(), "original");
    env::remove_var(VAR);
}

#[test]
#[serial]
fn test_unset_system_properties_are_removed() {
    trestle_logging::init_for_tests();
    env::remove_var(VAR);
    let (_, runner) = runner(&HarnessConfig::default());

    let node = system_property_decorator(
        Fixture::new("reads_var", |_| {
            assert_eq!(env::var(VAR).unwrap(), "set");
            Ok(())
        }),
        props([(VAR, "set")]),
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    assert!(env::var(VAR).is_err());
}
