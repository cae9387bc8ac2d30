use trestle_logging::info;

use crate::{env::Requirement, node::Node};

/// An ordered collection of nodes.
///
/// Entries run in insertion order, a failing entry does not stop its
/// siblings. Suites add no setup or teardown of their own.
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    entries: Vec<Node>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: vec![],
        }
    }

    /// Builds a suite from the supplied entries, keeping their order
    pub fn compose(name: impl Into<String>, entries: impl IntoIterator<Item = Node>) -> Self {
        Self {
            name: name.into(),
            entries: entries.into_iter().collect(),
        }
    }

    pub fn add(mut self, entry: impl Into<Node>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Adds the entry only if the requirement is met.
    /// Omitted entries never appear in a run.
    pub fn add_when(self, requirement: Requirement, entry: impl Into<Node>) -> Self {
        match requirement {
            Ok(()) => self.add(entry),
            Err(unavailable) => {
                let entry = entry.into();
                info!(
                    "Omitting {} from suite {}: {}",
                    entry.name(),
                    self.name,
                    unavailable
                );
                self
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[Node] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
