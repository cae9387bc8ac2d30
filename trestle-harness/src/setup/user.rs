use trestle_connectors_base::common::property::SQL_AUTHORIZATION;
use trestle_core::config::{Change, DEFAULT_DBNAME_SQL, TEST_DBO};

use super::{
    builtin_authentication, change_database, database_property_decorator_with_options, props,
    single_use_database, PropertyOptions,
};
use crate::{decorator::Decorator, node::Node};

/// Runs the subtree with different default credentials
pub fn change_user_decorator(
    node: impl Into<Node>,
    user: impl Into<String>,
    password: impl Into<String>,
) -> Node {
    let user = user.into();

    Decorator::new(format!("user:{}", user), node)
        .change(Change::credentials(user, password))
        .into()
}

/// Runs the subtree as the owner of a database with SQL authorization
/// enabled. The property is left in place once the subtree completes.
pub fn sql_authorization_decorator(node: impl Into<Node>) -> Node {
    let node = change_database(sql_authorization_property(node), DEFAULT_DBNAME_SQL);

    change_user_decorator(node, TEST_DBO, "dummy")
}

/// As [`sql_authorization_decorator`] with builtin authentication for
/// `TEST_DBO` followed by the supplied users
pub fn sql_authorization_decorator_with_users(
    node: impl Into<Node>,
    users: &[&str],
    token: &str,
) -> Node {
    let users = std::iter::once(TEST_DBO)
        .chain(users.iter().copied())
        .collect::<Vec<_>>();

    sql_authorization_decorator(builtin_authentication(node, &users, token))
}

/// As [`sql_authorization_decorator`] against a database which is removed
/// once the subtree completes
pub fn sql_authorization_decorator_single_use(
    node: impl Into<Node>,
    database: impl Into<String>,
    shutdown: bool,
) -> Node {
    let node = single_use_database(sql_authorization_property(node), database.into(), shutdown);

    change_user_decorator(node, TEST_DBO, "dummy")
}

fn sql_authorization_property(node: impl Into<Node>) -> Node {
    database_property_decorator_with_options(
        node,
        props([(SQL_AUTHORIZATION, "true")]),
        PropertyOptions {
            teardown: false,
            static_properties: true,
        },
    )
}
