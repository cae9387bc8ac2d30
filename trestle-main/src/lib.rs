use std::{rc::Rc, time::Duration};

use trestle_connectors_memory::MemoryEngine;
use trestle_core::{
    config::HarnessConfig,
    err::{Context, Result},
};
use trestle_harness::{Environment, RunOptions, RunReport, Runner, Services};
use trestle_logging::info;

pub mod args;
pub mod conf;
pub mod spawned;
pub mod suites;

/// Composes and runs the named suites, every registered suite when none
/// are named, against a fresh memory engine
pub fn run_suites(conf: &HarnessConfig, names: &[String]) -> Result<RunReport> {
    let selected = suites::select(names)?;
    let engine = MemoryEngine::new();
    let services = Services::new(
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
    )
    .with_server_wait_time(Duration::from_millis(conf.server_wait_time_ms));

    let env = Environment::capture(&engine);
    let options = RunOptions::from(conf);
    let runner = Runner::new(services, conf.configuration()).with_options(options);
    let mut report = RunReport::default();

    for suite in selected {
        info!("Composing suite {}", suite.name);
        let node = (suite.build)(&env).with_context(|| format!("Failed to compose suite {}", suite.name))?;
        report.merge(runner.run(&node)?);

        if options.stop_after_first_fail && report.has_failures() {
            info!("Stopping after first failure");
            break;
        }
    }

    Ok(report)
}
