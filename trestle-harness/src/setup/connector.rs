use trestle_connectors_base::interface::Feature;
use trestle_core::config::{Change, ConnectorKind, Holdability, Isolation, SslMode};
use trestle_logging::info;

use super::Properties;
use crate::{decorator::Decorator, env::Environment, node::Node, suite::Suite};

/// Runs the subtree with connections obtained from a data source
pub fn connection_ds_decorator(node: impl Into<Node>) -> Node {
    connector(node, ConnectorKind::DataSource)
}

/// Runs the subtree with connections obtained from a connection pool data
/// source, or nothing when the driver does not have one
pub fn connection_cp_decorator(env: &Environment, node: impl Into<Node>) -> Node {
    connector_when(env, Feature::ConnectionPool, node, ConnectorKind::ConnectionPool)
}

/// Runs the subtree with connections obtained from an XA data source, or
/// nothing when the driver does not have one
pub fn connection_xa_decorator(env: &Environment, node: impl Into<Node>) -> Node {
    connector_when(env, Feature::Xa, node, ConnectorKind::Xa)
}

pub fn change_ssl_decorator(node: impl Into<Node>, ssl: SslMode) -> Node {
    Decorator::new(format!("ssl:{}", ssl.attribute()), node)
        .change(Change::Ssl(Some(ssl)))
        .into()
}

/// Adds attributes to the connection url of the subtree
pub fn connection_attributes_decorator(node: impl Into<Node>, attrs: Properties) -> Node {
    let name = format!(
        "connection_attributes[{}]",
        attrs.keys().cloned().collect::<Vec<_>>().join(",")
    );

    Decorator::new(name, node)
        .change(Change::ConnectionAttributes(attrs))
        .into()
}

pub fn holdability_decorator(node: impl Into<Node>, holdability: Holdability) -> Node {
    Decorator::new(format!("holdability:{:?}", holdability), node)
        .change(Change::Holdability(holdability))
        .into()
}

pub fn isolation_decorator(node: impl Into<Node>, isolation: Isolation) -> Node {
    Decorator::new(format!("isolation:{:?}", isolation), node)
        .change(Change::Isolation(isolation))
        .into()
}

/// Sets the login timeout, in seconds, of connections made by the subtree
pub fn login_timeout_decorator(node: impl Into<Node>, secs: u32) -> Node {
    Decorator::new(format!("login_timeout:{}", secs), node)
        .change(Change::LoginTimeout(Some(secs)))
        .into()
}

fn connector(node: impl Into<Node>, kind: ConnectorKind) -> Node {
    Decorator::new(format!("connector:{}", kind), node)
        .change(Change::Connector(kind))
        .into()
}

fn connector_when(
    env: &Environment,
    feature: Feature,
    node: impl Into<Node>,
    kind: ConnectorKind,
) -> Node {
    match env.require_feature(feature) {
        Ok(()) => connector(node, kind),
        Err(unavailable) => {
            info!("Using an empty suite in place of {}: {}", kind, unavailable);
            Suite::new(format!("empty: {}", unavailable)).into()
        }
    }
}
