use std::{cell::RefCell, rc::Rc};

use trestle_core::config::Configuration;

/// The stack of configurations entered by a runner.
///
/// Entries are only pushed through [`Ambient::enter`] and are popped when
/// the returned guard is dropped, so the stack always unwinds in the
/// reverse order it was built. Clones share the same stack.
#[derive(Debug, Clone, Default)]
pub struct Ambient {
    stack: Rc<RefCell<Vec<Configuration>>>,
}

impl Ambient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `conf` the active configuration until the guard is dropped
    #[must_use = "the configuration is only active while the guard is alive"]
    pub fn enter(&self, conf: Configuration) -> AmbientGuard {
        self.stack.borrow_mut().push(conf);

        AmbientGuard {
            ambient: self.clone(),
            depth: self.depth(),
        }
    }

    /// The active configuration
    pub fn current(&self) -> Option<Configuration> {
        self.stack.borrow().last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }
}

/// Restores the previously active configuration on drop
#[derive(Debug)]
pub struct AmbientGuard {
    ambient: Ambient,
    depth: usize,
}

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        let mut stack = self.ambient.stack.borrow_mut();
        debug_assert_eq!(stack.len(), self.depth, "ambient configuration popped out of order");
        stack.truncate(self.depth - 1);
    }
}
