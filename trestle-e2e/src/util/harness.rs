use std::{path::Path, rc::Rc, time::Duration};

use trestle_config::loader::ConfigLoader;
use trestle_connectors_memory::MemoryEngine;
use trestle_core::config::HarnessConfig;
use trestle_harness::{Environment, Node, RunOptions, RunReport, Runner, Services};
use trestle_logging::info;

/// Services backed by the supplied engine
pub fn services(engine: &MemoryEngine, wait: Duration) -> Services {
    Services::new(
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
    )
    .with_server_wait_time(wait)
}

/// Loads the harness config at the supplied path
pub fn load_config(path: impl AsRef<Path>) -> HarnessConfig {
    ConfigLoader::new().load(path.as_ref()).unwrap()
}

/// A runner over a fresh memory engine configured from the harness config
pub fn runner(conf: &HarnessConfig) -> (MemoryEngine, Runner) {
    runner_with_engine(MemoryEngine::new(), conf)
}

pub fn runner_with_engine(engine: MemoryEngine, conf: &HarnessConfig) -> (MemoryEngine, Runner) {
    let services = services(&engine, Duration::from_millis(conf.server_wait_time_ms));
    let runner = Runner::new(services, conf.configuration()).with_options(RunOptions::from(conf));

    (engine, runner)
}

/// The environment a suite is composed under
pub fn environment(engine: &MemoryEngine) -> Environment {
    Environment::capture(engine)
}

/// Loads the config, composes the tree under the engine's environment and
/// runs it
pub fn run_with_config(
    path: impl AsRef<Path>,
    build: impl FnOnce(&Environment) -> Node,
) -> (MemoryEngine, RunReport) {
    let conf = load_config(path);
    let (engine, runner) = runner(&conf);
    let node = build(&environment(&engine));

    info!("Running {} under {}", node.name(), runner.root());
    let report = runner.run(&node).unwrap();
    assert_eq!(runner.ambient(), None);

    (engine, report)
}
