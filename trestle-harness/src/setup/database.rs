use std::sync::atomic::{AtomicU64, Ordering};

use trestle_core::{
    config::Change,
    err::{Context, Result},
};
use trestle_logging::debug;

use crate::{context::TestContext, decorator::Decorator, node::Node};

static UNIQUE_DATABASES: AtomicU64 = AtomicU64::new(0);

/// Generates a physical database name which has not been used by this process
pub fn generate_unique_database_name() -> String {
    let id = UNIQUE_DATABASES.fetch_add(1, Ordering::SeqCst);

    format!("singleUse/oneuse{:x}", id)
}

/// Runs the subtree against a fresh database which is removed afterwards
pub fn single_use_database_decorator(node: impl Into<Node>) -> Node {
    single_use_database(node, generate_unique_database_name(), true)
}

/// Runs the subtree against a fresh database with the supplied name
pub fn single_use_database_decorator_with_name(node: impl Into<Node>, name: impl Into<String>) -> Node {
    single_use_database(node, name.into(), true)
}

/// As [`single_use_database_decorator`] but the database is removed
/// without being shut down first
pub fn single_use_database_decorator_no_shutdown(node: impl Into<Node>) -> Node {
    single_use_database(node, generate_unique_database_name(), false)
}

/// Makes a fresh database available under `logical` without changing
/// the default database of the subtree
pub fn additional_database_decorator(node: impl Into<Node>, logical: impl Into<String>) -> Node {
    additional_database(node, logical.into(), true)
}

pub fn additional_database_decorator_no_shutdown(
    node: impl Into<Node>,
    logical: impl Into<String>,
) -> Node {
    additional_database(node, logical.into(), false)
}

/// Switches the default database of the subtree, leaving it in place afterwards
pub(crate) fn change_database(node: impl Into<Node>, name: impl Into<String>) -> Node {
    let name = name.into();

    Decorator::new(format!("database:{}", name), node)
        .change(Change::default_database(name))
        .into()
}

pub(crate) fn single_use_database(node: impl Into<Node>, physical: String, shutdown: bool) -> Node {
    let dropped = physical.clone();

    Decorator::new(format!("single_use_database:{}", physical), node)
        .change(Change::default_database(physical))
        .after(move |ctx| remove_database(ctx, &dropped, shutdown))
        .into()
}

fn additional_database(node: impl Into<Node>, logical: String, shutdown: bool) -> Node {
    let physical = generate_unique_database_name();
    let dropped = physical.clone();

    Decorator::new(format!("additional_database:{}", logical), node)
        .change(Change::additional_database(logical, physical))
        .after(move |ctx| remove_database(ctx, &dropped, shutdown))
        .into()
}

pub(crate) fn remove_database(ctx: &TestContext, physical: &str, shutdown: bool) -> Result<()> {
    let driver = ctx.driver();
    let conf = ctx.configuration();

    if shutdown {
        driver
            .shutdown_database(conf, physical)
            .with_context(|| format!("Failed to shut down database {}", physical))?;
    }

    debug!("Removing single use database {}", physical);
    driver
        .drop_database(conf, physical)
        .with_context(|| format!("Failed to remove database {}", physical))
}
