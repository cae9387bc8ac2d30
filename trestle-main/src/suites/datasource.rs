use trestle_core::{
    config::{ConnectorKind, SslMode},
    err::{ensure, Result},
};
use trestle_harness::{
    node::Node,
    setup::{
        change_ssl_decorator, connection_attributes_decorator, connection_cp_decorator,
        connection_ds_decorator, connection_xa_decorator, props,
    },
    suites::default_suite,
    Environment, Fixture, Suite,
};

fn connects_with(kind: ConnectorKind) -> Fixture {
    Fixture::new(format!("connects_with_{}", kind), move |ctx| {
        let actual = ctx.configuration().connector();
        ensure!(actual == kind, "Expected connector {} but got {}", kind, actual);

        ctx.open_default_connection()?.query("VALUES 1")?;
        Ok(())
    })
}

fn url_ends_with(suffix: &'static str) -> Fixture {
    Fixture::new("url_attributes", move |ctx| {
        let url = ctx.configuration().url();
        ensure!(url.ends_with(suffix), "Expected {} to end with {}", url, suffix);

        ctx.open_default_connection()?;
        Ok(())
    })
}

pub fn suite(env: &Environment) -> Result<Node> {
    let fixtures = Suite::new("connectors")
        .add(connects_with(ConnectorKind::DriverManager))
        .add(connection_ds_decorator(connects_with(ConnectorKind::DataSource)))
        .add(connection_cp_decorator(env, connects_with(ConnectorKind::ConnectionPool)))
        .add(connection_xa_decorator(env, connects_with(ConnectorKind::Xa)))
        .add(change_ssl_decorator(url_ends_with(";ssl=basic"), SslMode::Basic))
        .add(connection_attributes_decorator(
            url_ends_with(";retrieveMessageText=true"),
            props([("retrieveMessageText", "true")]),
        ));

    Ok(default_suite(env, "datasource", fixtures))
}
