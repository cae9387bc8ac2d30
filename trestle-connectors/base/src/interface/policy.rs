use serde::{Deserialize, Serialize};
use trestle_core::err::Result;

/// An externally defined permission set.
/// The harness passes it through without interpreting its contents.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub source: String,
}

impl Policy {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Installs and removes security policies for the process
pub trait PolicyInstaller {
    /// Installs the policy, replacing any installed policy
    fn install(&self, policy: &Policy) -> Result<()>;

    /// Removes the installed policy, if any
    fn uninstall(&self) -> Result<()>;

    /// The currently installed policy
    fn installed(&self) -> Option<Policy>;
}
