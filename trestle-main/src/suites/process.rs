use std::env;

use trestle_core::err::{ensure, Context, Result};
use trestle_harness::{
    node::Node,
    process::spawned_fixture,
    setup::single_use_database_decorator_with_name,
    suites::embedded_suite,
    Environment, Fixture, Suite,
};

use crate::spawned::{FRESH_ENGINE, VERIFY_CONFIGURATION};

/// The database the spawned fixtures are pointed at
pub const SPAWNED_DATABASE: &str = "singleUse/spawned";

pub fn suite(_env: &Environment) -> Result<Node> {
    let program = env::current_exe().context("Failed to locate the running executable")?;

    let fixtures = Suite::new("spawned")
        .add(Fixture::new("parent_creates_table", |ctx| {
            let mut con = ctx.open_default_connection()?;
            con.execute("CREATE TABLE parent_only (a INT)")?;

            ensure!(
                con.database() == SPAWNED_DATABASE,
                "Connected to {} rather than {}",
                con.database(),
                SPAWNED_DATABASE
            );
            Ok(())
        }))
        .add(spawned_fixture(VERIFY_CONFIGURATION, &program, Vec::<String>::new()))
        .add(spawned_fixture(FRESH_ENGINE, &program, Vec::<String>::new()));

    Ok(embedded_suite(
        "process",
        single_use_database_decorator_with_name(fixtures, SPAWNED_DATABASE),
    ))
}
