use std::env;

use trestle_connectors_base::interface::Policy;
use trestle_core::err::{ensure, Context, Result};
use trestle_harness::{
    node::Node,
    setup::{
        additional_database_decorator, database_property_decorator, props,
        security_policy_decorator, system_property_decorator,
    },
    suites::embedded_suite,
    Environment, Fixture, Suite,
};

const WAIT_TIMEOUT: &str = "derby.locks.waitTimeout";
const SAMPLE_VAR: &str = "TRESTLE_SAMPLE_SETTING";

pub fn suite(_env: &Environment) -> Result<Node> {
    let fixtures = Suite::new("properties")
        .add(database_property_decorator(
            Fixture::new("database_property_visible", |ctx| {
                let value = ctx
                    .open_default_connection()?
                    .get_database_property(WAIT_TIMEOUT)?;

                ensure!(
                    value.as_deref() == Some("3"),
                    "Expected {}=3, got {:?}",
                    WAIT_TIMEOUT,
                    value
                );
                Ok(())
            }),
            props([(WAIT_TIMEOUT, "3")]),
        ))
        .add(Fixture::new("database_property_restored", |ctx| {
            let value = ctx
                .open_default_connection()?
                .get_database_property(WAIT_TIMEOUT)?;

            ensure!(value.is_none(), "{} was not restored: {:?}", WAIT_TIMEOUT, value);
            Ok(())
        }))
        .add(system_property_decorator(
            Fixture::new("system_property_visible", |_| {
                let value = env::var(SAMPLE_VAR).with_context(|| format!("{} is not set", SAMPLE_VAR))?;

                ensure!(value == "enabled", "Unexpected {}={}", SAMPLE_VAR, value);
                Ok(())
            }),
            props([(SAMPLE_VAR, "enabled")]),
        ))
        .add(security_policy_decorator(
            Fixture::new("policy_installed", |ctx| {
                let installed = ctx.policy_installer().installed();

                ensure!(
                    installed.as_ref().map(|p| p.name.as_str()) == Some("restricted"),
                    "Unexpected policy {:?}",
                    installed
                );
                Ok(())
            }),
            Policy::new(
                "restricted",
                "grant { permission java.io.FilePermission \"${derby.system.home}\", \"read\"; };",
            ),
        ))
        .add(additional_database_decorator(
            Fixture::new("second_database", |ctx| {
                let mut con = ctx.open_connection("second")?;
                con.execute("CREATE TABLE t1 (a INT)")?;

                ensure!(
                    con.database() != ctx.configuration().default_db_name(),
                    "The second database is the default database"
                );
                Ok(())
            }),
            "second",
        ));

    Ok(embedded_suite("properties", fixtures))
}
