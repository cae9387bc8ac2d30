pub use anyhow::*;
