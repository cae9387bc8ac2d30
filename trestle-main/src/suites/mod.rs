//! The suites registered with the host runner

use trestle_core::err::{bail, Result};
use trestle_harness::{node::Node, Environment};

pub mod authentication;
pub mod datasource;
pub mod process;
pub mod properties;
pub mod schema;
pub mod sqlauth;

pub type SuiteBuilder = fn(&Environment) -> Result<Node>;

/// A suite which can be run by name
#[derive(Clone, Copy)]
pub struct RegisteredSuite {
    pub name: &'static str,
    pub build: SuiteBuilder,
}

pub const SUITES: &[RegisteredSuite] = &[
    RegisteredSuite {
        name: "schema",
        build: schema::suite,
    },
    RegisteredSuite {
        name: "authentication",
        build: authentication::suite,
    },
    RegisteredSuite {
        name: "sqlauth",
        build: sqlauth::suite,
    },
    RegisteredSuite {
        name: "datasource",
        build: datasource::suite,
    },
    RegisteredSuite {
        name: "properties",
        build: properties::suite,
    },
    RegisteredSuite {
        name: "process",
        build: process::suite,
    },
];

/// Looks up the named suites, every registered suite when `names` is empty
pub fn select(names: &[String]) -> Result<Vec<RegisteredSuite>> {
    if names.is_empty() {
        return Ok(SUITES.to_vec());
    }

    names
        .iter()
        .map(|name| match SUITES.iter().find(|s| s.name == name) {
            Some(suite) => Ok(*suite),
            None => bail!(
                "Unknown suite \"{}\", expected one of: {}",
                name,
                SUITES.iter().map(|s| s.name).collect::<Vec<_>>().join(", ")
            ),
        })
        .collect()
}
