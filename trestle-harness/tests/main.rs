use std::{cell::RefCell, rc::Rc, time::Duration};

use pretty_assertions::assert_eq;
use trestle_connectors_memory::MemoryEngine;
use trestle_core::config::Configuration;
use trestle_harness::{
    setup::{schema_decorator, single_use_database_decorator_with_name},
    Fixture, NodeState, Runner, Services, Suite,
};

fn services(engine: &MemoryEngine) -> Services {
    Services::new(
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
    )
    .with_server_wait_time(Duration::from_millis(200))
}

#[test]
fn test_schema_scenario_order_and_independence() {
    let engine = MemoryEngine::new();
    let order = Rc::new(RefCell::new(vec![]));

    let (a, b) = (order.clone(), order.clone());
    let node = Suite::new("scenario")
        .add(Fixture::new("A", move |_| {
            a.borrow_mut().push("A".to_string());
            Ok(())
        }))
        .add(schema_decorator(
            Fixture::new("B", move |ctx| {
                b.borrow_mut().push("B".to_string());
                let mut con = ctx.open_default_connection()?;
                con.execute("INSERT INTO t1 VALUES (1)")?;
                con.execute("INSERT INTO missing VALUES (1)")?;
                Ok(())
            }),
            ["CREATE TABLE t1 (a INT)"],
        ));

    let report = Runner::new(services(&engine), Configuration::default())
        .run(&node.into())
        .unwrap();

    assert_eq!(*order.borrow(), vec!["A", "B"]);
    assert_eq!(report.record("scenario/A").unwrap().state, NodeState::Passed);
    assert_eq!(
        report.record("scenario/schema/B").unwrap().state,
        NodeState::Failed
    );
    assert_eq!(report.failures().len(), 1);
    assert!(report.failures()[0].cause.contains("MISSING"));
    // dropSchema ran despite the failure
    let db = engine.database("wombat").unwrap();
    assert_eq!(db.table("APP", "T1"), None);
}

#[test]
fn test_sibling_single_use_databases_are_isolated() {
    let engine = MemoryEngine::new();
    let seen = Rc::new(RefCell::new(vec![]));

    let fixture = |seen: Rc<RefCell<Vec<String>>>| {
        Fixture::new("f", move |ctx| {
            seen.borrow_mut()
                .push(ctx.ambient().unwrap().default_db_name().to_string());
            Ok(())
        })
    };

    let node = Suite::new("s")
        .add(single_use_database_decorator_with_name(fixture(seen.clone()), "db1"))
        .add(single_use_database_decorator_with_name(fixture(seen.clone()), "db2"));

    let runner = Runner::new(services(&engine), Configuration::default());
    let report = runner.run(&node.into()).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(*seen.borrow(), vec!["db1", "db2"]);
    assert_eq!(runner.ambient(), None);
}
