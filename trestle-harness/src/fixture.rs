use std::{fmt, rc::Rc};

use trestle_core::err::Result;

use crate::context::TestContext;

pub type FixtureBody = Rc<dyn Fn(&TestContext) -> Result<()>>;

/// A named test operation.
///
/// The body fails by returning an error or by panicking, eg through `assert!`.
/// Connections opened by the body are dropped before it returns.
#[derive(Clone)]
pub struct Fixture {
    name: String,
    body: FixtureBody,
}

impl Fixture {
    pub fn new(name: impl Into<String>, body: impl Fn(&TestContext) -> Result<()> + 'static) -> Self {
        Self {
            name: name.into(),
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&self, ctx: &TestContext) -> Result<()> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture").field("name", &self.name).finish()
    }
}
