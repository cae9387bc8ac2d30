pub mod ambient;
pub mod assert;
pub mod context;
pub mod decorator;
pub mod env;
pub mod fixture;
pub mod node;
pub mod ports;
pub mod process;
pub mod report;
pub mod runner;
pub mod setup;
pub mod state;
pub mod suite;
pub mod suites;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{Services, TestContext};
pub use decorator::Decorator;
pub use env::{Environment, Requirement, Unavailable};
pub use fixture::Fixture;
pub use node::{Node, NodeKind, PlannedFixture};
pub use report::{Failure, FailureKind, NodeRecord, RunReport};
pub use runner::{RunOptions, Runner};
pub use state::NodeState;
pub use suite::Suite;
