use std::{
    collections::{BTreeMap, HashSet},
    env,
    fmt::{self, Display},
};

use trestle_connectors_base::interface::{Driver, Feature};

/// An external collaborator a suite entry needs is not configured
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Unavailable {
    pub reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for Unavailable {}

/// The outcome of a composition-time precondition check
pub type Requirement = std::result::Result<(), Unavailable>;

/// What was available when a suite was composed
#[derive(Debug, Clone, Default)]
pub struct Environment {
    features: HashSet<Feature>,
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// An environment with nothing available
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the driver's features and the process environment
    pub fn capture(driver: &dyn Driver) -> Self {
        Self {
            features: Feature::ALL
                .into_iter()
                .filter(|f| driver.supports(*f))
                .collect(),
            vars: env::vars().collect(),
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|s| s.as_str())
    }

    pub fn require_feature(&self, feature: Feature) -> Requirement {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(Unavailable::new(format!("{:?} is not supported", feature)))
        }
    }

    /// Requires a non-empty environment variable, eg the address of a
    /// directory server
    pub fn require_var(&self, name: &str) -> Requirement {
        match self.var(name) {
            Some(v) if !v.is_empty() => Ok(()),
            _ => Err(Unavailable::new(format!("{} is not set", name))),
        }
    }
}
