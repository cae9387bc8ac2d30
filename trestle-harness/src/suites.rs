use trestle_connectors_base::interface::Feature;
use trestle_core::config::{Change, Topology};
use trestle_logging::info;

use crate::{
    decorator::Decorator,
    env::Environment,
    node::Node,
    setup::{clean_database_decorator, client_server_decorator, existing_server_decorator},
    suite::Suite,
};

/// Runs the node with an embedded engine
pub fn embedded_suite(name: &str, node: impl Into<Node>) -> Node {
    Decorator::new(format!("{}:embedded", name), node)
        .change(Change::Topology(Topology::Embedded))
        .into()
}

/// Runs the node against a network server started for the suite, or
/// nothing when client/server is not available
pub fn client_server_suite(env: &Environment, name: &str, node: impl Into<Node>) -> Node {
    if let Err(unavailable) = env.require_feature(Feature::ClientServer) {
        info!("Omitting client/server run of {}: {}", name, unavailable);
        return Suite::new("empty: no network server support").into();
    }

    Suite::new(format!("{}:client", name))
        .add(client_server_decorator(node))
        .into()
}

/// Runs the node embedded and then client/server, each against a
/// database cleaned before and after
pub fn default_suite(env: &Environment, name: &str, node: impl Into<Node>) -> Node {
    let node = node.into();

    Suite::new(name)
        .add(embedded_suite(name, clean_database_decorator(node.clone())))
        .add(client_server_suite(env, name, clean_database_decorator(node)))
        .into()
}

/// As [`default_suite`] without cleaning the database
pub fn default_suite_no_clean(env: &Environment, name: &str, node: impl Into<Node>) -> Node {
    let node = node.into();

    Suite::new(name)
        .add(embedded_suite(name, node.clone()))
        .add(client_server_suite(env, name, node))
        .into()
}

/// Runs the node against a server which was started outside of the run
pub fn existing_server_suite(
    name: &str,
    node: impl Into<Node>,
    clean: bool,
    host: &str,
    port: u16,
) -> Node {
    let node = if clean {
        clean_database_decorator(node)
    } else {
        node.into()
    };

    Suite::new(format!("{}:existing_server", name))
        .add(existing_server_decorator(node, host, port))
        .into()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trestle_connectors_base::interface::NetworkServer;
    use trestle_core::config::Configuration;

    use super::*;
    use crate::{fixture::Fixture, runner::Runner, testing::mock_services};

    fn create_table() -> Fixture {
        Fixture::new("create_table", |ctx| {
            ctx.open_default_connection()?
                .execute("CREATE TABLE t1 (a INT)")?;
            Ok(())
        })
    }

    #[test]
    fn test_embedded_suite() {
        let root = Configuration::default().derive(Change::Topology(Topology::Client {
            host: "localhost".into(),
            port: 1527,
        }));
        let plan = embedded_suite("s", create_table()).plan(&root);

        assert_eq!(plan[0].path, "s:embedded/create_table");
        assert_eq!(plan[0].configuration.topology(), &Topology::Embedded);
    }

    #[test]
    fn test_client_server_suite_without_support() {
        let node = client_server_suite(&Environment::new(), "s", create_table());

        assert_eq!(node.name(), "empty: no network server support");
        assert_eq!(node.fixture_count(), 0);
    }

    #[test]
    fn test_default_suite_runs_both_topologies() {
        let (engine, services) = mock_services();
        let env = Environment::capture(&engine);

        let node = default_suite(&env, "s", create_table());
        let plan = node.plan(&Configuration::default());
        assert_eq!(
            plan.iter().map(|p| p.path.as_str()).collect::<Vec<_>>(),
            vec![
                "s/s:embedded/clean_database/create_table",
                "s/s:client/client_server/clean_database/create_table",
            ]
        );
        assert!(plan[1].configuration.topology().is_remote());

        // both runs create the same table, which only works if each cleans up
        let report = Runner::new(services, Configuration::default())
            .run(&node)
            .unwrap();

        assert!(report.is_success(), "{}", report);
        assert_eq!(report.fixtures_run(), 2);
        assert!(!engine.ping("localhost", 1527));
    }

    #[test]
    fn test_default_suite_no_clean_leaves_objects() {
        let (engine, services) = mock_services();
        let env = Environment::capture(&engine);

        let report = Runner::new(services, Configuration::default())
            .run(&default_suite_no_clean(&env, "s", create_table()))
            .unwrap();

        // the client run finds the table the embedded run left behind
        assert_eq!(report.fixtures_run(), 2);
        assert_eq!(report.fixtures_passed(), 1);
    }

    #[test]
    fn test_existing_server_suite_cleans_inside_server() {
        let (engine, services) = mock_services();
        engine.start("localhost", 1600).unwrap();

        let node = existing_server_suite("s", create_table(), true, "localhost", 1600);
        let plan = node.plan(&Configuration::default());
        assert_eq!(
            plan[0].path,
            "s:existing_server/existing_server:localhost:1600/clean_database/create_table"
        );

        let report = Runner::new(services, Configuration::default())
            .run(&node)
            .unwrap();

        assert!(report.is_success(), "{}", report);
        assert!(engine.ping("localhost", 1600));
    }
}
