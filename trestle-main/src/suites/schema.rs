use trestle_connectors_base::common::state;
use trestle_core::{
    data::DataValue,
    err::{bail, Result},
};
use trestle_harness::{
    assert::{assert_row_count, assert_rows, assert_sql_state},
    node::Node,
    setup::schema_decorator,
    suites::default_suite,
    Environment, Fixture, Suite,
};

const SCHEMA: [&str; 3] = [
    "CREATE SCHEMA inventory",
    "CREATE TABLE inventory.items (id INT, name VARCHAR(20))",
    "CREATE VIEW inventory.item_view AS SELECT * FROM inventory.items",
];

pub fn suite(env: &Environment) -> Result<Node> {
    let fixtures = Suite::new("fixtures")
        .add(Fixture::new("insert_and_count", |ctx| {
            let mut con = ctx.open_default_connection()?;
            con.execute("DELETE FROM inventory.items")?;
            con.execute("INSERT INTO inventory.items VALUES (1, 'bolt'), (2, 'nut')")?;

            assert_row_count(con.as_mut(), "inventory.items", 2)
        }))
        .add(Fixture::new("view_reads_table", |ctx| {
            let mut con = ctx.open_default_connection()?;
            con.execute("DELETE FROM inventory.items")?;
            con.execute("INSERT INTO inventory.items VALUES (3, 'washer')")?;

            assert_rows(
                con.as_mut(),
                "SELECT * FROM inventory.item_view",
                vec![vec![DataValue::Int64(3), DataValue::from("washer")]],
            )
        }))
        .add(Fixture::new("duplicate_table_rejected", |ctx| {
            let mut con = ctx.open_default_connection()?;

            assert_sql_state(
                state::OBJECT_EXISTS,
                con.execute("CREATE TABLE inventory.items (id INT)"),
            )
        }))
        .add(Fixture::new("view_is_read_only", |ctx| {
            let mut con = ctx.open_default_connection()?;

            if con.execute("INSERT INTO inventory.item_view VALUES (4, 'nail')").is_ok() {
                bail!("Inserting into a view should fail");
            }
            Ok(())
        }));

    Ok(default_suite(env, "schema", schema_decorator(fixtures, SCHEMA)))
}
