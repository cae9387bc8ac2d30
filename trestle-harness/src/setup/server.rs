use std::{
    thread,
    time::{Duration, Instant},
};

use trestle_core::{
    config::{Change, Configuration, Topology, DEFAULT_HOSTNAME, DEFAULT_PORT},
    err::{bail, Context, Result},
};
use trestle_logging::{debug, info};

use crate::{context::TestContext, decorator::Decorator, node::Node, ports};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the subtree against a network server started on the host and port
/// of the active client topology, or localhost:1527 when embedded
pub fn client_server_decorator(node: impl Into<Node>) -> Node {
    Decorator::new("client_server", node)
        .configure(|conf| {
            let (host, port) = client_address(conf);
            conf.derive(Change::Topology(Topology::Client { host, port }))
        })
        .before(start_server)
        .after(stop_server)
        .into()
}

/// Runs the subtree against a network server started on the supplied port
pub fn client_server_decorator_with_port(node: impl Into<Node>, port: u16) -> Node {
    Decorator::new(format!("client_server:{}", port), node)
        .configure(move |conf| {
            let (host, _) = client_address(conf);
            conf.derive(Change::Topology(Topology::Client { host, port }))
        })
        .before(start_server)
        .after(stop_server)
        .into()
}

/// Runs the subtree against a network server on the next port handed out
/// by the process-wide port allocator
pub fn client_server_decorator_with_alternative_port(node: impl Into<Node>) -> Result<Node> {
    let port = ports::next_available_port()?;

    Ok(client_server_decorator_with_port(node, port))
}

/// Runs the subtree against a server which is managed outside of the run
pub fn existing_server_decorator(node: impl Into<Node>, host: impl Into<String>, port: u16) -> Node {
    let host = host.into();

    Decorator::new(format!("existing_server:{}:{}", host, port), node)
        .change(Change::Topology(Topology::Client { host, port }))
        .into()
}

fn client_address(conf: &Configuration) -> (String, u16) {
    match conf.topology() {
        Topology::Client { host, port } => (host.clone(), *port),
        Topology::Embedded => (DEFAULT_HOSTNAME.to_string(), DEFAULT_PORT),
    }
}

fn server_address(ctx: &TestContext) -> Result<(String, u16)> {
    match ctx.configuration().topology() {
        Topology::Client { host, port } => Ok((host.clone(), *port)),
        Topology::Embedded => bail!("Network server requires a client topology"),
    }
}

fn start_server(ctx: &TestContext) -> Result<()> {
    let (host, port) = server_address(ctx)?;
    let server = ctx.server();
    let wait = ctx.services().server_wait_time;

    if server.ping(&host, port) {
        debug!("Network server already running on {}:{}", host, port);
        return Ok(());
    }

    if !wait_until(wait, || server.is_port_free(&host, port)) {
        bail!(
            "Timed out after {:?} waiting for port {}:{} to become free",
            wait,
            host,
            port
        );
    }

    info!("Starting network server on {}:{}", host, port);
    server
        .start(&host, port)
        .with_context(|| format!("Failed to start network server on {}:{}", host, port))?;

    if !wait_until(wait, || server.ping(&host, port)) {
        bail!(
            "Timed out after {:?} waiting for network server on {}:{} to start",
            wait,
            host,
            port
        );
    }

    Ok(())
}

fn stop_server(ctx: &TestContext) -> Result<()> {
    let (host, port) = server_address(ctx)?;

    info!("Stopping network server on {}:{}", host, port);
    ctx.server()
        .stop(&host, port)
        .with_context(|| format!("Failed to stop network server on {}:{}", host, port))
}

/// Polls `cond` until it holds or `wait` elapses
fn wait_until(wait: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let started = Instant::now();

    loop {
        if cond() {
            return true;
        }

        if started.elapsed() >= wait {
            return false;
        }

        thread::sleep(POLL_INTERVAL);
    }
}
