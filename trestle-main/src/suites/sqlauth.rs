use trestle_connectors_base::{common::state, interface::Connection};
use trestle_core::{config::TEST_DBO, err::Result};
use trestle_harness::{
    assert::{assert_row_count, assert_sql_state},
    context::TestContext,
    node::Node,
    setup::{clean_database_decorator, sql_authorization_decorator_with_users},
    suites::default_suite_no_clean,
    Environment, Fixture, Suite,
};

const TOKEN: &str = "pw";

fn connect_as_u1(ctx: &TestContext) -> Result<Box<dyn Connection>> {
    ctx.open_connection_as("U1", &ctx.configuration().password_for("U1"))
}

pub fn suite(env: &Environment) -> Result<Node> {
    let fixtures = Suite::new("fixtures")
        .add(Fixture::new("owner_is_unrestricted", |ctx| {
            let mut dbo = ctx.open_default_connection()?;
            dbo.execute("CREATE TABLE accounts (id INT)")?;
            dbo.execute("INSERT INTO accounts VALUES (1)")?;

            assert_row_count(dbo.as_mut(), "accounts", 1)
        }))
        .add(Fixture::new("other_user_denied", |ctx| {
            ctx.open_default_connection()?
                .execute("CREATE TABLE secrets (id INT)")?;
            let mut u1 = connect_as_u1(ctx)?;

            assert_sql_state(
                state::ACCESS_DENIED,
                u1.query(&format!("SELECT * FROM {}.secrets", TEST_DBO)),
            )?;
            assert_sql_state(
                state::ACCESS_DENIED,
                u1.execute(&format!("CREATE TABLE {}.mine (id INT)", TEST_DBO)),
            )
        }))
        .add(Fixture::new("grant_and_revoke", |ctx| {
            let mut dbo = ctx.open_default_connection()?;
            dbo.execute("CREATE TABLE shared (id INT)")?;
            let mut u1 = connect_as_u1(ctx)?;
            let select = format!("SELECT * FROM {}.shared", TEST_DBO);

            dbo.execute("GRANT SELECT ON shared TO U1")?;
            u1.query(&select)?;

            dbo.execute("REVOKE SELECT ON shared FROM U1")?;
            assert_sql_state(state::ACCESS_DENIED, u1.query(&select))
        }))
        .add(Fixture::new("user_owns_own_schema", |ctx| {
            let mut u1 = connect_as_u1(ctx)?;
            u1.execute("CREATE TABLE notes (id INT)")?;
            u1.execute("INSERT INTO notes VALUES (1), (2)")?;

            assert_row_count(u1.as_mut(), "notes", 2)
        }));

    Ok(default_suite_no_clean(
        env,
        "sqlauth",
        sql_authorization_decorator_with_users(clean_database_decorator(fixtures), &["U1", "U2"], TOKEN),
    ))
}
