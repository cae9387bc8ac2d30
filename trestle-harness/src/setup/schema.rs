use trestle_connectors_base::common::{state, SqlError};
use trestle_core::err::{Context, Result};
use trestle_logging::{debug, trace};

use crate::{context::TestContext, decorator::Decorator, node::Node};

/// Drops every user object in the default database before and after the subtree
pub fn clean_database_decorator(node: impl Into<Node>) -> Node {
    Decorator::wrap("clean_database", node, clean_database, clean_database).into()
}

/// Creates schema objects for the subtree and drops all user objects afterwards.
///
/// Statements failing because their object already exists are skipped so the
/// setup can be applied to a database which already has the schema.
pub fn schema_decorator(
    node: impl Into<Node>,
    statements: impl IntoIterator<Item = impl Into<String>>,
) -> Node {
    let statements = statements.into_iter().map(Into::into).collect::<Vec<String>>();

    Decorator::new("schema", node)
        .before(move |ctx| create_schema(ctx, &statements))
        .after(clean_database)
        .into()
}

fn create_schema(ctx: &TestContext, statements: &[String]) -> Result<()> {
    let mut con = ctx.open_default_connection()?;

    for sql in statements {
        match con.execute(sql) {
            Ok(_) => trace!("Executed \"{}\"", sql),
            Err(err) if SqlError::has_state(&err, &[state::OBJECT_EXISTS, state::SCHEMA_EXISTS]) => {
                debug!("Skipping \"{}\": {:#}", sql, err)
            }
            Err(err) => return Err(err.context(format!("Failed to execute \"{}\"", sql))),
        }
    }

    Ok(())
}

/// Drops every user created object in the default database.
///
/// Objects are dropped views first, then tables, then schemas. An object
/// still referenced by another is retried once its dependants are gone.
pub fn clean_database(ctx: &TestContext) -> Result<()> {
    let mut con = ctx.open_default_connection()?;
    let mut remaining = con.user_objects()?;

    while !remaining.is_empty() {
        let mut failed = vec![];
        let mut last_error = None;

        for object in remaining.iter() {
            match con.execute(&object.drop_statement()) {
                Ok(_) => debug!("Dropped {}", object),
                Err(err) => {
                    trace!("Deferring drop of {}: {:#}", object, err);
                    failed.push(object.clone());
                    last_error = Some(err);
                }
            }
        }

        if failed.len() == remaining.len() {
            if let Some(err) = last_error {
                return Err(err).with_context(|| {
                    format!(
                        "Failed to clean database {}",
                        ctx.configuration().default_db_name()
                    )
                });
            }
        }

        remaining = failed;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trestle_connectors_base::{
        common::{ObjectKind, SchemaObject},
        interface::Driver,
    };
    use trestle_core::config::Configuration;

    use super::*;
    use crate::{
        ambient::Ambient, assert::assert_row_count, fixture::Fixture, report::FailureKind,
        runner::Runner, testing::mock_services,
    };

    const SCHEMA: [&str; 3] = [
        "CREATE SCHEMA s1",
        "CREATE TABLE s1.t1 (a INT, b VARCHAR(10))",
        "CREATE VIEW s1.v1 AS SELECT * FROM s1.t1",
    ];

    #[test]
    fn test_schema_decorator_creates_and_cleans() {
        let (engine, services) = mock_services();
        let node = schema_decorator(
            Fixture::new("f", |ctx| {
                let mut con = ctx.open_default_connection()?;
                con.execute("INSERT INTO s1.t1 VALUES (1, 'one')")?;
                assert_row_count(con.as_mut(), "s1.v1", 1)
            }),
            SCHEMA,
        );

        let report = Runner::new(services, Configuration::default())
            .run(&node)
            .unwrap();

        assert!(report.is_success(), "{}", report);
        let mut con = engine
            .connect(&Configuration::default(), "wombat", "APP", "APP")
            .unwrap();
        assert!(con.user_objects().unwrap().is_empty());
    }

    #[test]
    fn test_schema_decorator_before_is_idempotent() {
        let (engine, services) = mock_services();
        let node = schema_decorator(Fixture::new("f", |_| Ok(())), SCHEMA);
        let dec = node.as_decorator().unwrap();
        let conf = Configuration::default();
        let ambient = Ambient::new();
        let ctx = TestContext::new(&services, &conf, &ambient);
        let before = dec.before_action().unwrap();

        before(&ctx).unwrap();
        let once = engine
            .connect(&conf, "wombat", "APP", "APP")
            .unwrap()
            .user_objects()
            .unwrap();
        before(&ctx).unwrap();
        let twice = engine
            .connect(&conf, "wombat", "APP", "APP")
            .unwrap()
            .user_objects()
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(
            once,
            vec![
                SchemaObject::new(ObjectKind::View, "S1", "V1"),
                SchemaObject::new(ObjectKind::Table, "S1", "T1"),
                SchemaObject::new(ObjectKind::Schema, "S1", "S1"),
            ]
        );
    }

    #[test]
    fn test_schema_decorator_invalid_statement_fails_setup() {
        let (_, services) = mock_services();
        let node = schema_decorator(Fixture::new("f", |_| Ok(())), ["CREATE NONSENSE"]);

        let report = Runner::new(services, Configuration::default())
            .run(&node)
            .unwrap();

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::Setup);
        assert!(failures[0].cause.contains("CREATE NONSENSE"));
    }

    #[test]
    fn test_clean_database_decorator_cleans_on_entry_and_exit() {
        let (engine, services) = mock_services();
        let conf = Configuration::default();
        engine
            .connect(&conf, "wombat", "APP", "APP")
            .unwrap()
            .execute("CREATE TABLE leftover (a INT)")
            .unwrap();

        let node = clean_database_decorator(Fixture::new("f", |ctx| {
            let mut con = ctx.open_default_connection()?;
            assert!(con.user_objects()?.is_empty());
            con.execute("CREATE TABLE t1 (a INT)")?;
            Ok(())
        }));
        let report = Runner::new(services, conf.clone()).run(&node).unwrap();

        assert!(report.is_success(), "{}", report);
        let mut con = engine.connect(&conf, "wombat", "APP", "APP").unwrap();
        assert!(con.user_objects().unwrap().is_empty());
    }

    #[test]
    fn test_clean_database_dependent_views() {
        let (engine, services) = mock_services();
        let conf = Configuration::default();
        let mut con = engine.connect(&conf, "wombat", "APP", "APP").unwrap();
        con.execute("CREATE TABLE t1 (a INT)").unwrap();
        // v1 sorts first but v2 depends on it
        con.execute("CREATE VIEW v1 AS SELECT * FROM t1").unwrap();
        con.execute("CREATE VIEW v2 AS SELECT * FROM v1").unwrap();

        let ambient = Ambient::new();
        clean_database(&TestContext::new(&services, &conf, &ambient)).unwrap();

        assert!(con.user_objects().unwrap().is_empty());
    }
}
