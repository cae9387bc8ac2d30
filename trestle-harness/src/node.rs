use enum_as_inner::EnumAsInner;
use serde::Serialize;
use trestle_core::config::Configuration;

use crate::{decorator::Decorator, fixture::Fixture, suite::Suite};

/// A node of a composed test tree
#[derive(Debug, Clone, EnumAsInner)]
pub enum Node {
    Fixture(Fixture),
    Decorator(Decorator),
    Suite(Suite),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum NodeKind {
    Fixture,
    Decorator,
    Suite,
}

/// A fixture together with the configuration it will run under
#[derive(Debug, PartialEq, Clone)]
pub struct PlannedFixture {
    pub path: String,
    pub configuration: Configuration,
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Fixture(f) => f.name(),
            Node::Decorator(d) => d.name(),
            Node::Suite(s) => s.name(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Fixture(_) => NodeKind::Fixture,
            Node::Decorator(_) => NodeKind::Decorator,
            Node::Suite(_) => NodeKind::Suite,
        }
    }

    pub fn fixture_count(&self) -> usize {
        match self {
            Node::Fixture(_) => 1,
            Node::Decorator(d) => d.child().fixture_count(),
            Node::Suite(s) => s.entries().iter().map(|e| e.fixture_count()).sum(),
        }
    }

    /// Flattens the tree into the ordered fixtures it runs and the
    /// configuration each one sees, starting from `root`
    pub fn plan(&self, root: &Configuration) -> Vec<PlannedFixture> {
        let mut planned = vec![];
        self.plan_into(root, None, &mut planned);
        planned
    }

    fn plan_into(&self, conf: &Configuration, parent: Option<&str>, planned: &mut Vec<PlannedFixture>) {
        let path = node_path(parent, self.name());

        match self {
            Node::Fixture(_) => planned.push(PlannedFixture {
                path,
                configuration: conf.clone(),
            }),
            Node::Decorator(d) => d.child().plan_into(&d.derive(conf), Some(&path), planned),
            Node::Suite(s) => {
                for entry in s.entries() {
                    entry.plan_into(conf, Some(&path), planned);
                }
            }
        }
    }
}

pub(crate) fn node_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}/{}", parent, name),
        None => name.to_string(),
    }
}

impl From<Fixture> for Node {
    fn from(f: Fixture) -> Self {
        Node::Fixture(f)
    }
}

impl From<Decorator> for Node {
    fn from(d: Decorator) -> Self {
        Node::Decorator(d)
    }
}

impl From<Suite> for Node {
    fn from(s: Suite) -> Self {
        Node::Suite(s)
    }
}
