mod connection;
pub use connection::*;
mod server;
pub use server::*;
mod policy;
pub use policy::*;
