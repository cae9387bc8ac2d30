use std::{cell::RefCell, rc::Rc};

use trestle_core::err::bail;
use trestle_harness::{Decorator, Fixture, Node};

/// Records the order in which fixtures and decorator actions ran
#[derive(Debug, Clone, Default)]
pub struct Events {
    inner: Rc<RefCell<Vec<String>>>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.inner.borrow_mut().push(event.into());
    }

    pub fn get(&self) -> Vec<String> {
        self.inner.borrow().clone()
    }

    pub fn fixture(&self, name: &str) -> Fixture {
        let events = self.clone();
        let event = name.to_string();

        Fixture::new(name, move |_| {
            events.push(event.clone());
            Ok(())
        })
    }

    pub fn failing_fixture(&self, name: &str) -> Fixture {
        let events = self.clone();
        let event = name.to_string();

        Fixture::new(name, move |_| {
            events.push(event.clone());
            bail!("{} failed", event)
        })
    }

    pub fn panicking_fixture(&self, name: &str) -> Fixture {
        let events = self.clone();
        let event = name.to_string();

        Fixture::new(name, move |_| {
            events.push(event.clone());
            panic!("{} panicked", event)
        })
    }

    /// A decorator recording "<name>.before" and "<name>.after"
    pub fn decorator(&self, name: &str, child: impl Into<Node>) -> Decorator {
        let (before, after) = (self.clone(), self.clone());
        let (before_event, after_event) = (format!("{}.before", name), format!("{}.after", name));

        Decorator::new(name, child)
            .before(move |_| {
                before.push(before_event.clone());
                Ok(())
            })
            .after(move |_| {
                after.push(after_event.clone());
                Ok(())
            })
    }

    /// A decorator whose before action fails
    pub fn failing_decorator(&self, name: &str, child: impl Into<Node>) -> Decorator {
        let (before, after) = (self.clone(), self.clone());
        let (before_event, after_event) = (format!("{}.before", name), format!("{}.after", name));

        Decorator::new(name, child)
            .before(move |_| {
                before.push(before_event.clone());
                bail!("{} could not be set up", before_event)
            })
            .after(move |_| {
                after.push(after_event.clone());
                Ok(())
            })
    }
}
