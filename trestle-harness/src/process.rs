use std::{
    env,
    ffi::OsString,
    path::PathBuf,
    process::Command,
};

use trestle_core::{
    config::Configuration,
    err::{bail, Context, Result},
};
use trestle_logging::{debug, MaxLogLength};

use crate::fixture::Fixture;

/// Names the fixture the second process should run
pub const SPAWNED_FIXTURE_VAR: &str = "TRESTLE_SPAWNED_FIXTURE";
/// The json serialised configuration of the spawning fixture
pub const CONFIGURATION_VAR: &str = "TRESTLE_CONFIGURATION";

/// A fixture which launches `program` as a second process and passes
/// when it exits successfully.
///
/// Only the effective configuration crosses the process boundary, the
/// child starts with none of the parent's connections or engine state.
pub fn spawned_fixture(
    name: impl Into<String>,
    program: impl Into<PathBuf>,
    args: impl IntoIterator<Item = impl Into<OsString>>,
) -> Fixture {
    let name = name.into();
    let program = program.into();
    let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();
    let fixture = name.clone();

    Fixture::new(name, move |ctx| {
        let conf = serde_json::to_string(ctx.configuration())
            .context("Failed to serialise configuration")?;
        debug!("Spawning {} for fixture {}", program.display(), fixture);

        let output = Command::new(&program)
            .args(&args)
            .env(SPAWNED_FIXTURE_VAR, &fixture)
            .env(CONFIGURATION_VAR, conf)
            .output()
            .with_context(|| format!("Failed to launch {}", program.display()))?;

        if !output.status.success() {
            bail!(
                "Spawned fixture {} exited with {}: {}",
                fixture,
                output.status,
                MaxLogLength::new(Some(4000), String::from_utf8_lossy(&output.stderr).trim())
            );
        }

        Ok(())
    })
}

/// The receiving side of a spawned fixture
#[derive(Debug, PartialEq, Clone)]
pub struct SpawnRequest {
    pub fixture: String,
    pub configuration: Configuration,
}

impl SpawnRequest {
    /// Reads the request from the environment, `None` when this process
    /// was not spawned by a fixture
    pub fn from_env() -> Result<Option<Self>> {
        let fixture = match env::var(SPAWNED_FIXTURE_VAR) {
            Ok(fixture) => fixture,
            Err(_) => return Ok(None),
        };

        let configuration = match env::var(CONFIGURATION_VAR) {
            Ok(json) => serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse {}", CONFIGURATION_VAR))?,
            Err(_) => Configuration::default(),
        };

        Ok(Some(Self {
            fixture,
            configuration,
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use trestle_core::config::Change;

    use super::*;
    use crate::{
        node::Node,
        report::FailureKind,
        runner::Runner,
        testing::mock_services,
    };

    fn run(fixture: Fixture) -> crate::report::RunReport {
        let (_, services) = mock_services();
        Runner::new(services, Configuration::default())
            .run(&Node::from(fixture))
            .unwrap()
    }

    #[test]
    fn test_spawned_fixture_passes_on_success() {
        let report = run(spawned_fixture(
            "recovery",
            "sh",
            ["-c", "test \"$TRESTLE_SPAWNED_FIXTURE\" = recovery && test -n \"$TRESTLE_CONFIGURATION\""],
        ));

        assert!(report.is_success());
    }

    #[test]
    fn test_spawned_fixture_fails_with_stderr() {
        let report = run(spawned_fixture(
            "crash",
            "sh",
            ["-c", "echo database was not recovered >&2; exit 3"],
        ));

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::Assertion);
        assert!(failures[0].cause.contains("database was not recovered"));
    }

    #[test]
    fn test_spawned_fixture_missing_program() {
        let report = run(spawned_fixture(
            "missing",
            "/nonexistent/trestle-program",
            Vec::<String>::new(),
        ));

        assert!(report.failures()[0].cause.contains("Failed to launch"));
    }

    #[test]
    #[serial]
    fn test_spawn_request_from_env() {
        env::remove_var(SPAWNED_FIXTURE_VAR);
        assert_eq!(SpawnRequest::from_env().unwrap(), None);

        let conf = Configuration::default().derive(Change::default_database("db1"));
        env::set_var(SPAWNED_FIXTURE_VAR, "recovery");
        env::set_var(CONFIGURATION_VAR, serde_json::to_string(&conf).unwrap());

        assert_eq!(
            SpawnRequest::from_env().unwrap(),
            Some(SpawnRequest {
                fixture: "recovery".into(),
                configuration: conf,
            })
        );

        env::set_var(CONFIGURATION_VAR, "{not json");
        assert!(SpawnRequest::from_env().is_err());

        env::remove_var(SPAWNED_FIXTURE_VAR);
        env::remove_var(CONFIGURATION_VAR);
    }
}
