use trestle_core::err::Result;

/// Controls a network server which remote-topology connections go through
pub trait NetworkServer {
    /// Starts listening on the supplied address.
    /// Starting a server that is already listening there succeeds.
    fn start(&self, host: &str, port: u16) -> Result<()>;

    /// Stops the server listening on the supplied address.
    /// Stopping a server that is not running succeeds.
    fn stop(&self, host: &str, port: u16) -> Result<()>;

    /// Whether a server is accepting connections on the supplied address
    fn ping(&self, host: &str, port: u16) -> bool;

    /// Whether nothing is bound to the supplied address
    fn is_port_free(&self, host: &str, port: u16) -> bool {
        !self.ping(host, port)
    }
}
