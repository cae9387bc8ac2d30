use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::Instant,
};

use trestle_core::{
    config::{Configuration, HarnessConfig},
    err::{anyhow, ensure, Error, Result},
};
use trestle_logging::{debug, error, info, warn};

use crate::{
    ambient::Ambient,
    context::{Services, TestContext},
    decorator::Decorator,
    fixture::Fixture,
    node::{node_path, Node},
    report::{Failure, FailureKind, RunReport},
};

/// Options which change how a run proceeds
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct RunOptions {
    /// Once a failure is recorded no further fixture or setup action runs.
    /// Teardown of decorators already entered still runs.
    pub stop_after_first_fail: bool,
}

impl From<&HarnessConfig> for RunOptions {
    fn from(conf: &HarnessConfig) -> Self {
        Self {
            stop_after_first_fail: conf.stop_after_first_fail,
        }
    }
}

/// Walks a composed tree depth first, one node at a time
pub struct Runner {
    services: Services,
    root: Configuration,
    options: RunOptions,
    ambient: Ambient,
}

impl Runner {
    pub fn new(services: Services, root: Configuration) -> Self {
        Self {
            services,
            root,
            options: RunOptions::default(),
            ambient: Ambient::new(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Configuration {
        &self.root
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// The configuration currently active, `None` outside of a run
    pub fn ambient(&self) -> Option<Configuration> {
        self.ambient.current()
    }

    /// Runs the tree under the root configuration
    pub fn run(&self, node: &Node) -> Result<RunReport> {
        info!("Running {} ({} fixtures) under {}", node.name(), node.fixture_count(), self.root);
        let mut report = RunReport::default();

        {
            let _root = self.ambient.enter(self.root.clone());
            self.visit(node, &self.root, None, &mut report)?;
        }

        info!(
            "Finished {}: {} of {} fixtures passed",
            node.name(),
            report.fixtures_passed(),
            report.fixtures_run()
        );
        Ok(report)
    }

    fn should_stop(&self, report: &RunReport) -> bool {
        self.options.stop_after_first_fail && report.has_failures()
    }

    /// Returns whether the node and everything beneath it passed
    fn visit(
        &self,
        node: &Node,
        conf: &Configuration,
        parent: Option<&str>,
        report: &mut RunReport,
    ) -> Result<bool> {
        if self.should_stop(report) {
            return Ok(true);
        }

        let path = node_path(parent, node.name());
        let depth = self.ambient.depth();
        let started = Instant::now();
        let idx = report.begin(path.clone(), node.kind())?;
        debug!("Entering {}", path);

        let (passed, failure) = match node {
            Node::Fixture(fixture) => self.run_fixture(fixture, conf, &path),
            Node::Decorator(decorator) => self.run_decorator(decorator, conf, &path, report)?,
            Node::Suite(suite) => {
                let mut passed = true;
                for entry in suite.entries() {
                    passed &= self.visit(entry, conf, Some(&path), report)?;
                }
                (passed, None)
            }
        };

        ensure!(
            self.ambient.depth() == depth,
            "Ambient configuration was not restored on leaving {}",
            path
        );
        report.finish(idx, passed, failure, started.elapsed())?;
        debug!("Leaving {} ({})", path, if passed { "passed" } else { "failed" });

        Ok(passed)
    }

    fn run_fixture(
        &self,
        fixture: &Fixture,
        conf: &Configuration,
        path: &str,
    ) -> (bool, Option<Failure>) {
        let _guard = if self.ambient.current().as_ref() == Some(conf) {
            None
        } else {
            Some(self.ambient.enter(conf.clone()))
        };
        let ctx = TestContext::new(&self.services, conf, &self.ambient);

        match invoke(|| fixture.run(&ctx)) {
            Ok(()) => {
                info!("{} passed", path);
                (true, None)
            }
            Err(err) => {
                error!("{} failed under [{}]: {:#}", path, conf, err);
                (false, Some(failure(FailureKind::Assertion, path, conf, &err)))
            }
        }
    }

    fn run_decorator(
        &self,
        decorator: &Decorator,
        conf: &Configuration,
        path: &str,
        report: &mut RunReport,
    ) -> Result<(bool, Option<Failure>)> {
        let derived = decorator.derive(conf);
        let _guard = self.ambient.enter(derived.clone());
        let ctx = TestContext::new(&self.services, &derived, &self.ambient);

        let mut passed = true;
        let mut own_failure = None;

        let setup = match decorator.before_action() {
            Some(before) => invoke(|| before(&ctx)),
            None => Ok(()),
        };

        match setup {
            Ok(()) => passed = self.visit(decorator.child(), &derived, Some(path), report)?,
            Err(err) => {
                error!("Setup of {} failed under [{}]: {:#}", path, derived, err);
                passed = false;
                own_failure = Some(failure(FailureKind::Setup, path, &derived, &err));
            }
        }

        if let Some(after) = decorator.after_action() {
            if let Err(err) = invoke(|| after(&ctx)) {
                warn!("Cleanup of {} failed under [{}]: {:#}", path, derived, err);

                if passed {
                    own_failure = Some(failure(FailureKind::Cleanup, path, &derived, &err));
                }
                passed = false;
            }
        }

        Ok((passed, own_failure))
    }
}

fn failure(kind: FailureKind, path: &str, conf: &Configuration, err: &Error) -> Failure {
    Failure {
        kind,
        path: path.to_string(),
        configuration: conf.clone(),
        cause: format!("{:#}", err),
    }
}

/// Runs the callback, converting a panic into an error
fn invoke(cb: impl FnOnce() -> Result<()>) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(cb)) {
        Ok(res) => res,
        Err(payload) => Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
