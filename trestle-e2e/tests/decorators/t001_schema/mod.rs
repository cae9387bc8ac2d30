use pretty_assertions::assert_eq;
use trestle_connectors_base::interface::NetworkServer;
use trestle_core::config::HarnessConfig;
use trestle_e2e::util::harness::{environment, runner};
use trestle_harness::{
    assert::assert_row_count, setup::schema_decorator, suites::default_suite, Fixture, Suite,
};

const SCHEMA: [&str; 2] = [
    "CREATE SCHEMA orders",
    "CREATE TABLE orders.lines (id INT, qty INT)",
];

#[test]
fn test_schema_is_created_and_dropped_for_each_topology() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());

    let fixtures = Suite::new("fixtures")
        .add(Fixture::new("insert", |ctx| {
            let mut con = ctx.open_default_connection()?;
            con.execute("INSERT INTO orders.lines VALUES (1, 10)")?;
            assert_row_count(con.as_mut(), "orders.lines", 1)
        }))
        .add(Fixture::new("sees_previous_insert", |ctx| {
            let mut con = ctx.open_default_connection()?;
            assert_row_count(con.as_mut(), "orders.lines", 1)
        }));
    let node = default_suite(&environment(&engine), "orders", schema_decorator(fixtures, SCHEMA));

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(
        report.fixture_paths(),
        vec![
            "orders/orders:embedded/clean_database/schema/fixtures/insert",
            "orders/orders:embedded/clean_database/schema/fixtures/sees_previous_insert",
            "orders/orders:client/client_server/clean_database/schema/fixtures/insert",
            "orders/orders:client/client_server/clean_database/schema/fixtures/sees_previous_insert",
        ]
    );

    let db = engine.database("wombat").unwrap();
    assert_eq!(db.table("ORDERS", "LINES"), None);
    assert!(!engine.ping("localhost", 1527));
}

#[test]
fn test_schema_setup_tolerates_existing_objects() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());

    let node = Suite::new("s")
        .add(Fixture::new("precreate", |ctx| {
            ctx.open_default_connection()?
                .execute("CREATE SCHEMA orders")?;
            Ok(())
        }))
        .add(schema_decorator(
            Fixture::new("uses_schema", |ctx| {
                let mut con = ctx.open_default_connection()?;
                assert_row_count(con.as_mut(), "orders.lines", 0)
            }),
            SCHEMA,
        ));

    let report = runner.run(&node.into()).unwrap();

    assert!(report.is_success(), "{}", report);
    assert_eq!(engine.database("wombat").unwrap().table("ORDERS", "LINES"), None);
}
