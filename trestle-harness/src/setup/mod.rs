//! Decorator factories for the common setups of a test run

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

mod connector;
pub use connector::*;
mod database;
pub use database::*;
mod policy;
pub use policy::*;
mod properties;
pub use properties::*;
mod schema;
pub use schema::*;
mod server;
pub use server::*;
mod user;
pub use user::*;

/// Key value pairs, eg database properties or environment variables
pub type Properties = BTreeMap<String, String>;

pub fn props<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Properties {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// State captured by a `before` action for its `after` action to restore.
///
/// Only the first capture is kept so a repeated `before` does not
/// overwrite the original state.
pub(crate) struct Saved<T> {
    inner: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for Saved<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Saved<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
        }
    }
}

impl<T> Saved<T> {
    pub fn capture(&self, cb: impl FnOnce() -> T) {
        let mut inner = self.inner.borrow_mut();
        if inner.is_none() {
            *inner = Some(cb());
        }
    }

    pub fn take(&self) -> Option<T> {
        self.inner.borrow_mut().take()
    }
}
