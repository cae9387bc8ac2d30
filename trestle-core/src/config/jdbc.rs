use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Where the database engine runs relative to the test process
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// The engine is booted inside the test process
    Embedded,
    /// Connections are made over the network to a server process
    Client { host: String, port: u16 },
}

impl Topology {
    pub fn is_embedded(&self) -> bool {
        matches!(self, Topology::Embedded)
    }

    pub fn is_remote(&self) -> bool {
        !self.is_embedded()
    }
}

impl Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Embedded => write!(f, "embedded"),
            Topology::Client { host, port } => write!(f, "client@{}:{}", host, port),
        }
    }
}

/// The mechanism used to obtain connections
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    #[default]
    DriverManager,
    DataSource,
    ConnectionPool,
    Xa,
}

impl Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectorKind::DriverManager => "DriverManager",
            ConnectorKind::DataSource => "DataSource",
            ConnectorKind::ConnectionPool => "ConnectionPoolDataSource",
            ConnectorKind::Xa => "XADataSource",
        };

        write!(f, "{}", name)
    }
}

/// SSL modes understood by the network client
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslMode {
    Off,
    Basic,
    PeerAuthentication,
}

impl SslMode {
    /// The value of the `ssl` connection attribute for this mode
    pub fn attribute(&self) -> &'static str {
        match self {
            SslMode::Off => "off",
            SslMode::Basic => "basic",
            SslMode::PeerAuthentication => "peerAuthentication",
        }
    }
}

/// Default result set holdability for new connections
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Holdability {
    #[default]
    HoldCursorsOverCommit,
    CloseCursorsAtCommit,
}

/// Default transaction isolation for new connections
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}
