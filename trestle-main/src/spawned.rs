//! Fixture bodies which run in a second process

use trestle_connectors_base::interface::Driver;
use trestle_connectors_memory::MemoryEngine;
use trestle_core::err::{bail, ensure, Result};
use trestle_harness::process::SpawnRequest;
use trestle_logging::info;

use crate::suites::process::SPAWNED_DATABASE;

pub const VERIFY_CONFIGURATION: &str = "verify_configuration";
pub const FRESH_ENGINE: &str = "fresh_engine";

pub type SpawnedBody = fn(&SpawnRequest) -> Result<()>;

pub const SPAWNED: &[(&str, SpawnedBody)] = &[
    (VERIFY_CONFIGURATION, verify_configuration),
    (FRESH_ENGINE, fresh_engine),
];

/// Runs the fixture body the spawning process asked for
pub fn run_spawned(req: &SpawnRequest) -> Result<()> {
    let body = match SPAWNED.iter().find(|(name, _)| *name == req.fixture) {
        Some((_, body)) => body,
        None => bail!("Unknown spawned fixture \"{}\"", req.fixture),
    };

    info!("Running spawned fixture {} under {}", req.fixture, req.configuration);
    body(req)
}

/// The configuration of the spawning fixture arrives intact
fn verify_configuration(req: &SpawnRequest) -> Result<()> {
    let conf = &req.configuration;

    ensure!(
        conf.default_db_name() == SPAWNED_DATABASE,
        "Expected default database {} but got {}",
        SPAWNED_DATABASE,
        conf.default_db_name()
    );
    ensure!(
        conf.topology().is_embedded(),
        "Expected an embedded topology but got {}",
        conf.topology()
    );
    conf.vet_database(SPAWNED_DATABASE)?;

    Ok(())
}

/// Nothing but the configuration crosses the process boundary, the second
/// process starts from an engine without the parent's databases
fn fresh_engine(req: &SpawnRequest) -> Result<()> {
    let conf = &req.configuration;
    let engine = MemoryEngine::new();

    ensure!(
        !engine.database_exists(conf.default_db_name()),
        "Database {} unexpectedly exists in the spawned process",
        conf.default_db_name()
    );

    let mut con = engine.connect(conf, conf.default_db_name(), conf.user(), conf.password())?;
    ensure!(
        con.query("SELECT * FROM parent_only").is_err(),
        "Table created by the parent process is visible"
    );
    con.execute("CREATE TABLE parent_only (a INT)")?;

    Ok(())
}
