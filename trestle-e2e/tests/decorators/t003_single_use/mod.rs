use std::{cell::RefCell, rc::Rc};

use pretty_assertions::assert_eq;
use trestle_connectors_base::interface::Driver;
use trestle_core::config::HarnessConfig;
use trestle_e2e::util::harness::runner;
use trestle_harness::{
    setup::{additional_database_decorator, single_use_database_decorator},
    Fixture, Suite,
};

fn create_table(seen: Rc<RefCell<Vec<String>>>) -> Fixture {
    Fixture::new("create_table", move |ctx| {
        let mut con = ctx.open_default_connection()?;
        con.execute("CREATE TABLE t1 (a INT)")?;
        seen.borrow_mut().push(con.database().to_string());
        Ok(())
    })
}

#[test]
fn test_sibling_single_use_databases() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());
    let seen = Rc::new(RefCell::new(vec![]));

    let node = Suite::new("s")
        .add(single_use_database_decorator(create_table(seen.clone())))
        .add(single_use_database_decorator(create_table(seen.clone())));

    let report = runner.run(&node.into()).unwrap();

    assert!(report.is_success(), "{}", report);
    let seen = seen.borrow().clone();
    assert_eq!(seen.len(), 2);
    assert_ne!(seen[0], seen[1]);
    for db in seen {
        assert!(db.starts_with("singleUse/oneuse"));
        assert!(!engine.database_exists(&db));
    }
    assert!(!engine.database_exists("wombat"));
}

#[test]
fn test_additional_database_is_addressed_by_logical_name() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());
    let physical = Rc::new(RefCell::new(None));

    let captured = physical.clone();
    let node = additional_database_decorator(
        Fixture::new("use_both", move |ctx| {
            let mut extra = ctx.open_connection("archive")?;
            extra.execute("CREATE TABLE t1 (a INT)")?;
            *captured.borrow_mut() = Some(extra.database().to_string());

            let mut default = ctx.open_default_connection()?;
            assert_eq!(default.database(), "wombat");
            default.execute("CREATE TABLE t1 (a INT)")?;
            Ok(())
        }),
        "archive",
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    let physical = physical.borrow().clone().unwrap();
    assert!(physical.starts_with("singleUse/oneuse"));
    assert!(!engine.database_exists(&physical));
    assert!(engine.database_exists("wombat"));
}
