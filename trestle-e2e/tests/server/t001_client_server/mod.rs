use pretty_assertions::assert_eq;
use trestle_connectors_base::{common::state, interface::NetworkServer};
use trestle_core::{config::Topology, err::Result};
use trestle_e2e::{current_dir, util::harness::run_with_config};
use trestle_harness::{
    assert::assert_sql_state,
    setup::{client_server_decorator, client_server_decorator_with_port},
    Fixture, Suite, TestContext,
};

fn check_server(ctx: &TestContext, port: u16) -> Result<()> {
    assert_eq!(
        ctx.configuration().topology(),
        &Topology::Client {
            host: "localhost".into(),
            port
        }
    );
    assert!(ctx.server().ping("localhost", port));

    let con = ctx.open_default_connection()?;
    assert_eq!(con.database(), "serverdb");
    Ok(())
}

#[test]
fn test_client_server_decorators_start_and_stop_servers() {
    trestle_logging::init_for_tests();

    let (engine, report) = run_with_config(current_dir!().join("config.yml"), |_| {
        Suite::new("s")
            .add(Fixture::new("refused_without_server", |ctx| {
                assert_sql_state(
                    state::CONNECTION_REFUSED,
                    ctx.open_default_connection().map(|_| ()),
                )
            }))
            .add(client_server_decorator(Fixture::new("configured_port", |ctx| {
                check_server(ctx, 1641)
            })))
            .add(client_server_decorator_with_port(
                Fixture::new("custom_port", |ctx| {
                    assert!(!ctx.server().ping("localhost", 1641));
                    check_server(ctx, 1642)
                }),
                1642,
            ))
            .into()
    });

    assert!(report.is_success(), "{}", report);
    assert_eq!(
        report.fixture_paths(),
        vec![
            "s/refused_without_server",
            "s/client_server/configured_port",
            "s/client_server:1642/custom_port",
        ]
    );
    assert!(!engine.ping("localhost", 1641));
    assert!(!engine.ping("localhost", 1642));
}
