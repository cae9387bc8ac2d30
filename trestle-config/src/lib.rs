pub mod loader;
pub(crate) mod ctx;
pub(crate) mod processor;
