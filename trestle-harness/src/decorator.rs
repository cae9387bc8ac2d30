use std::{fmt, rc::Rc};

use trestle_core::{
    config::{Change, Configuration},
    err::Result,
};

use crate::{context::TestContext, node::Node};

pub type Action = Rc<dyn Fn(&TestContext) -> Result<()>>;
pub type Derivation = Rc<dyn Fn(&Configuration) -> Configuration>;

/// Setup and teardown around a subtree.
///
/// On entry the decorator derives the configuration its subtree runs under,
/// then runs `before`, the child and finally `after`, all under the derived
/// configuration. `after` runs even when `before` or the child failed, so
/// actions must leave a well defined state when applied redundantly.
#[derive(Clone)]
pub struct Decorator {
    name: String,
    configure: Option<Derivation>,
    before: Option<Action>,
    after: Option<Action>,
    child: Box<Node>,
}

impl Decorator {
    pub fn new(name: impl Into<String>, child: impl Into<Node>) -> Self {
        Self {
            name: name.into(),
            configure: None,
            before: None,
            after: None,
            child: Box::new(child.into()),
        }
    }

    /// A decorator with both setup and teardown actions
    pub fn wrap(
        name: impl Into<String>,
        child: impl Into<Node>,
        before: impl Fn(&TestContext) -> Result<()> + 'static,
        after: impl Fn(&TestContext) -> Result<()> + 'static,
    ) -> Self {
        Self::new(name, child).before(before).after(after)
    }

    /// Derives the configuration of the subtree from the one active on entry
    pub fn configure(mut self, cb: impl Fn(&Configuration) -> Configuration + 'static) -> Self {
        self.configure = Some(Rc::new(cb));
        self
    }

    /// Shorthand for a derivation which applies a single change
    pub fn change(self, change: Change) -> Self {
        self.configure(move |conf| conf.derive(change.clone()))
    }

    pub fn before(mut self, cb: impl Fn(&TestContext) -> Result<()> + 'static) -> Self {
        self.before = Some(Rc::new(cb));
        self
    }

    pub fn after(mut self, cb: impl Fn(&TestContext) -> Result<()> + 'static) -> Self {
        self.after = Some(Rc::new(cb));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn child(&self) -> &Node {
        &self.child
    }

    pub(crate) fn before_action(&self) -> Option<&Action> {
        self.before.as_ref()
    }

    pub(crate) fn after_action(&self) -> Option<&Action> {
        self.after.as_ref()
    }

    /// The configuration the subtree runs under
    pub fn derive(&self, conf: &Configuration) -> Configuration {
        match &self.configure {
            Some(cb) => cb(conf),
            None => conf.clone(),
        }
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("name", &self.name)
            .field("configure", &self.configure.is_some())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("child", &self.child)
            .finish()
    }
}
