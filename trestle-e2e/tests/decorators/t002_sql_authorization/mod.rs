use pretty_assertions::assert_eq;
use trestle_connectors_base::common::{
    property::{REQUIRE_AUTHENTICATION, SQL_AUTHORIZATION},
    state,
};
use trestle_core::config::{HarnessConfig, DEFAULT_DBNAME_SQL, TEST_DBO};
use trestle_e2e::util::harness::runner;
use trestle_harness::{
    assert::assert_sql_state,
    setup::{clean_database_decorator, sql_authorization_decorator_with_users},
    Fixture, Suite,
};

#[test]
fn test_sql_authorization_with_builtin_users() {
    trestle_logging::init_for_tests();
    let (engine, runner) = runner(&HarnessConfig::default());

    let fixtures = Suite::new("fixtures")
        .add(Fixture::new("runs_as_dbo", |ctx| {
            assert_eq!(ctx.configuration().user(), TEST_DBO);
            assert_eq!(ctx.configuration().default_db_name(), DEFAULT_DBNAME_SQL);
            Ok(())
        }))
        .add(Fixture::new("grant_select", |ctx| {
            let mut dbo = ctx.open_default_connection()?;
            dbo.execute("CREATE TABLE accounts (id INT)")?;

            let mut alice = ctx.open_connection_as("ALICE", "ALICEsecret")?;
            assert_sql_state(
                state::ACCESS_DENIED,
                alice.query("SELECT * FROM TEST_DBO.accounts"),
            )?;

            dbo.execute("GRANT SELECT ON accounts TO ALICE")?;
            alice.query("SELECT * FROM TEST_DBO.accounts")?;
            Ok(())
        }))
        .add(Fixture::new("wrong_password", |ctx| {
            assert_sql_state(
                state::INVALID_AUTHORIZATION,
                ctx.open_connection_as("ALICE", "ALICE").map(|_| ()),
            )
        }));

    let node = sql_authorization_decorator_with_users(
        clean_database_decorator(fixtures),
        &["ALICE"],
        "secret",
    );

    let report = runner.run(&node).unwrap();

    assert!(report.is_success(), "{}", report);
    let db = engine.database(DEFAULT_DBNAME_SQL).unwrap();
    assert_eq!(db.owner(), TEST_DBO);
    assert_eq!(db.property(SQL_AUTHORIZATION), Some("true"));
    assert_eq!(db.property(REQUIRE_AUTHENTICATION), None);
    assert_eq!(db.table("TEST_DBO", "ACCOUNTS"), None);
}
