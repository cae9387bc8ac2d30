pub mod common;
pub mod interface;
