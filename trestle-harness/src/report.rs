use std::{
    fmt::{self, Display},
    time::Duration,
};

use itertools::Itertools;
use serde::Serialize;
use trestle_core::{config::Configuration, err::Result};
use trestle_logging::MaxLogLength;

use crate::{node::NodeKind, state::NodeState};

/// Why a node failed on its own account
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum FailureKind {
    /// An expectation inside a fixture was violated
    Assertion,
    /// A decorator's `before` action failed
    Setup,
    /// A decorator's `after` action failed and nothing else had failed
    Cleanup,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Assertion => "assertion failure",
            FailureKind::Setup => "setup failure",
            FailureKind::Cleanup => "cleanup failure",
        };

        write!(f, "{}", s)
    }
}

/// The failure record of one node
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub path: String,
    pub configuration: Configuration,
    /// The captured cause, including its context chain
    pub cause: String,
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [{}]: {}",
            self.path,
            self.kind,
            self.configuration,
            MaxLogLength::new(Some(2000), &self.cause)
        )
    }
}

/// What happened to a single visited node
#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    pub path: String,
    pub kind: NodeKind,
    pub state: NodeState,
    pub failure: Option<Failure>,
    pub duration: Duration,
}

/// The outcome of a run, one record per visited node in visiting order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    records: Vec<NodeRecord>,
}

impl RunReport {
    pub(crate) fn begin(&mut self, path: String, kind: NodeKind) -> Result<usize> {
        let mut state = NodeState::NotStarted;
        state.transition(NodeState::Running)?;

        self.records.push(NodeRecord {
            path,
            kind,
            state,
            failure: None,
            duration: Duration::ZERO,
        });
        Ok(self.records.len() - 1)
    }

    pub(crate) fn finish(
        &mut self,
        idx: usize,
        passed: bool,
        failure: Option<Failure>,
        duration: Duration,
    ) -> Result<()> {
        let record = &mut self.records[idx];
        record.state.transition(if passed {
            NodeState::Passed
        } else {
            NodeState::Failed
        })?;
        record.failure = failure;
        record.duration = duration;
        Ok(())
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub fn record(&self, path: &str) -> Option<&NodeRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Nodes which failed on their own account, in visiting order
    pub fn failures(&self) -> Vec<&Failure> {
        self.records
            .iter()
            .filter_map(|r| r.failure.as_ref())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.records.iter().any(|r| r.failure.is_some())
    }

    pub fn is_success(&self) -> bool {
        !self.has_failures()
    }

    fn fixtures(&self) -> impl Iterator<Item = &NodeRecord> {
        self.records.iter().filter(|r| r.kind == NodeKind::Fixture)
    }

    pub fn fixtures_run(&self) -> usize {
        self.fixtures().count()
    }

    pub fn fixtures_passed(&self) -> usize {
        self.fixtures()
            .filter(|r| r.state == NodeState::Passed)
            .count()
    }

    /// Paths of the fixtures which ran, in order
    pub fn fixture_paths(&self) -> Vec<&str> {
        self.fixtures().map(|r| r.path.as_str()).collect()
    }

    /// Appends the records of another run
    pub fn merge(&mut self, other: RunReport) {
        self.records.extend(other.records);
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failures = self.failures();

        writeln!(
            f,
            "{} fixtures run, {} passed, {} failures",
            self.fixtures_run(),
            self.fixtures_passed(),
            failures.len()
        )?;

        if !failures.is_empty() {
            write!(
                f,
                "{}",
                failures
                    .iter()
                    .enumerate()
                    .map(|(i, failure)| format!("{}) {}", i + 1, failure))
                    .join("\n")
            )?;
        }

        Ok(())
    }
}
