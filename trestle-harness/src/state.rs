use std::fmt::{self, Display};

use serde::Serialize;
use trestle_core::err::{bail, Result};

/// The lifecycle of a node during a run
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Default)]
pub enum NodeState {
    #[default]
    NotStarted,
    Running,
    Passed,
    Failed,
}

impl NodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Passed | NodeState::Failed)
    }

    /// Moves to the supplied state, terminal states are final
    pub fn transition(&mut self, to: NodeState) -> Result<()> {
        let valid = matches!(
            (*self, to),
            (NodeState::NotStarted, NodeState::Running)
                | (NodeState::Running, NodeState::Passed)
                | (NodeState::Running, NodeState::Failed)
        );

        if !valid {
            bail!("Invalid node state transition from {} to {}", self, to);
        }

        *self = to;
        Ok(())
    }
}

impl Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::NotStarted => "not started",
            NodeState::Running => "running",
            NodeState::Passed => "passed",
            NodeState::Failed => "failed",
        };

        write!(f, "{}", s)
    }
}
