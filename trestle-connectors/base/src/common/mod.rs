mod error;
pub use error::*;
mod object;
pub use object::*;
pub mod property;
