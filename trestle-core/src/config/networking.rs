use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use super::{DEFAULT_HOSTNAME, DEFAULT_PORT};

/// Networking options for the client/server topology
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct NetworkingConfig {
    /// The host the network server listens on
    #[serde(default = "default_host")]
    pub host: String,
    /// The base port of the network server
    #[serde(
        default = "default_port",
        deserialize_with = "port_from_num_or_string"
    )]
    pub port: u16,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOSTNAME.into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn port_from_num_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().map_err(de::Error::custom)?,
        Value::Number(num) => num
            .as_u64()
            .and_then(|num| u16::try_from(num).ok())
            .ok_or_else(|| de::Error::custom("failed to parse number as u16"))?,
        _ => return Err(de::Error::custom("must be integer or string")),
    })
}
