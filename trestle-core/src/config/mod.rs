use serde::{Deserialize, Serialize};

mod configuration;
pub use configuration::*;
mod jdbc;
pub use jdbc::*;
mod networking;
pub use networking::*;

/// The framework a harness run connects through
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    #[default]
    Embedded,
    Client,
}

/// The harness configuration file
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Whether the root configuration is embedded or client/server
    pub framework: Framework,
    /// Name of the default database
    pub database_name: String,
    /// Default user
    pub user: String,
    /// Default password
    pub password: String,
    /// Networking options
    pub networking: NetworkingConfig,
    /// Default ssl mode for client connections
    pub ssl: Option<SslMode>,
    pub holdability: Holdability,
    pub isolation: Isolation,
    /// Login timeout in seconds
    pub login_timeout_secs: Option<u32>,
    /// Log at debug level
    pub verbose: bool,
    /// Log at trace level
    pub trace: bool,
    /// Stop running fixtures once a failure has been recorded
    pub stop_after_first_fail: bool,
    /// How long to wait for a network server to come up
    pub server_wait_time_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            framework: Framework::default(),
            database_name: DEFAULT_DBNAME.into(),
            user: DEFAULT_USER_NAME.into(),
            password: DEFAULT_USER_PASSWORD.into(),
            networking: NetworkingConfig::default(),
            ssl: None,
            holdability: Holdability::default(),
            isolation: Isolation::default(),
            login_timeout_secs: None,
            verbose: false,
            trace: false,
            stop_after_first_fail: false,
            server_wait_time_ms: 240_000,
        }
    }
}

impl HarnessConfig {
    /// Builds the root configuration every suite starts from
    pub fn configuration(&self) -> Configuration {
        let topology = match self.framework {
            Framework::Embedded => Topology::Embedded,
            Framework::Client => Topology::Client {
                host: self.networking.host.clone(),
                port: self.networking.port,
            },
        };

        Configuration::new(
            topology,
            self.database_name.clone(),
            self.user.clone(),
            self.password.clone(),
        )
        .derive(Change::Ssl(self.ssl))
        .derive(Change::Holdability(self.holdability))
        .derive(Change::Isolation(self.isolation))
        .derive(Change::LoginTimeout(self.login_timeout_secs))
    }
}
