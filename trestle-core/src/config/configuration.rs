use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::err::{bail, Result};

use super::{ConnectorKind, Holdability, Isolation, SslMode, Topology};

pub const DEFAULT_DBNAME: &str = "wombat";
pub const DEFAULT_DBNAME_SQL: &str = "dbsqlauth";
pub const DEFAULT_USER_NAME: &str = "APP";
pub const DEFAULT_USER_PASSWORD: &str = "APP";
pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1527;
/// Owner of the SQL authorization database
pub const TEST_DBO: &str = "TEST_DBO";

const URL_BASE: &str = "jdbc:derby:";

/// An immutable description of the context a fixture executes in.
///
/// Decorators never mutate a configuration, they derive a new one from
/// the configuration that was active when their subtree was entered.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Configuration {
    topology: Topology,
    default_db_name: String,
    used_db_names: Vec<String>,
    logical_db_mapping: BTreeMap<String, String>,
    user: String,
    password: String,
    password_token: String,
    connector: ConnectorKind,
    connection_attributes: BTreeMap<String, String>,
    ssl: Option<SslMode>,
    holdability: Holdability,
    isolation: Isolation,
    login_timeout: Option<u32>,
}

/// A single-dimension change applied by [`Configuration::derive`]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Change {
    /// Replaces the default credentials
    Credentials {
        user: String,
        password: String,
        /// Replaces the builtin-authentication password suffix if set
        password_token: Option<String>,
    },
    /// Adds a database to the set of databases usable by the subtree
    Database {
        logical: String,
        physical: String,
        make_default: bool,
    },
    Topology(Topology),
    Connector(ConnectorKind),
    /// Merged into the existing connection attributes
    ConnectionAttributes(BTreeMap<String, String>),
    Ssl(Option<SslMode>),
    Holdability(Holdability),
    Isolation(Isolation),
    LoginTimeout(Option<u32>),
}

impl Change {
    pub fn credentials(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Credentials {
            user: user.into(),
            password: password.into(),
            password_token: None,
        }
    }

    /// A database which becomes the default under its own name
    pub fn default_database(name: impl Into<String>) -> Self {
        let name = name.into();

        Self::Database {
            logical: name.clone(),
            physical: name,
            make_default: true,
        }
    }

    /// A database addressed through a logical name
    pub fn additional_database(logical: impl Into<String>, physical: impl Into<String>) -> Self {
        Self::Database {
            logical: logical.into(),
            physical: physical.into(),
            make_default: false,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Configuration {
    /// The default embedded configuration
    pub fn embedded() -> Self {
        Self {
            topology: Topology::Embedded,
            default_db_name: DEFAULT_DBNAME.into(),
            used_db_names: vec![DEFAULT_DBNAME.into()],
            logical_db_mapping: [(DEFAULT_DBNAME.to_string(), DEFAULT_DBNAME.to_string())]
                .into_iter()
                .collect(),
            user: DEFAULT_USER_NAME.into(),
            password: DEFAULT_USER_PASSWORD.into(),
            password_token: String::new(),
            connector: ConnectorKind::default(),
            connection_attributes: BTreeMap::new(),
            ssl: None,
            holdability: Holdability::default(),
            isolation: Isolation::default(),
            login_timeout: None,
        }
    }

    /// Builds a root configuration from its main dimensions
    pub fn new(
        topology: Topology,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let database = database.into();

        Self {
            topology,
            default_db_name: database.clone(),
            used_db_names: vec![database.clone()],
            logical_db_mapping: [(database.clone(), database)].into_iter().collect(),
            user: user.into(),
            password: password.into(),
            ..Self::embedded()
        }
    }

    /// Returns a new configuration which differs from this one only
    /// in the dimension described by `change`
    pub fn derive(&self, change: Change) -> Self {
        let mut derived = self.clone();

        match change {
            Change::Credentials {
                user,
                password,
                password_token,
            } => {
                derived.user = user;
                derived.password = password;
                if let Some(token) = password_token {
                    derived.password_token = token;
                }
            }
            Change::Database {
                logical,
                physical,
                make_default,
            } => {
                derived.used_db_names.push(physical.clone());
                // a repeated logical name addresses the most recent database
                derived.logical_db_mapping.insert(logical, physical.clone());
                if make_default {
                    derived.default_db_name = physical;
                }
            }
            Change::Topology(topology) => derived.topology = topology,
            Change::Connector(connector) => derived.connector = connector,
            Change::ConnectionAttributes(attrs) => derived.connection_attributes.extend(attrs),
            Change::Ssl(ssl) => derived.ssl = ssl,
            Change::Holdability(holdability) => derived.holdability = holdability,
            Change::Isolation(isolation) => derived.isolation = isolation,
            Change::LoginTimeout(timeout) => derived.login_timeout = timeout,
        }

        derived
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn default_db_name(&self) -> &str {
        &self.default_db_name
    }

    pub fn used_db_names(&self) -> &[String] {
        &self.used_db_names
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn password_token(&self) -> &str {
        &self.password_token
    }

    pub fn connector(&self) -> ConnectorKind {
        self.connector
    }

    pub fn connection_attributes(&self) -> &BTreeMap<String, String> {
        &self.connection_attributes
    }

    pub fn ssl(&self) -> Option<SslMode> {
        self.ssl
    }

    pub fn holdability(&self) -> Holdability {
        self.holdability
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    pub fn login_timeout(&self) -> Option<u32> {
        self.login_timeout
    }

    /// The password builtin authentication assigns to `user`
    pub fn password_for(&self, user: &str) -> String {
        format!("{}{}", user, self.password_token)
    }

    /// The connection url of the default database
    pub fn url(&self) -> String {
        self.url_for(&self.default_db_name)
    }

    /// The connection url of the supplied physical database
    pub fn url_for(&self, physical: &str) -> String {
        let url = match &self.topology {
            Topology::Embedded => format!("{}{}", URL_BASE, physical),
            Topology::Client { host, port } => {
                format!("{}//{}:{}/{}", URL_BASE, host, port, physical)
            }
        };

        match self.attribute_string() {
            Some(attrs) => format!("{};{}", url, attrs),
            None => url,
        }
    }

    /// Connection attributes in `k=v;k=v` form, if any are set
    pub fn attribute_string(&self) -> Option<String> {
        let mut attrs = self.connection_attributes.clone();
        if let Some(ssl) = self.ssl {
            attrs.insert("ssl".into(), ssl.attribute().into());
        }

        if attrs.is_empty() {
            return None;
        }

        Some(attrs.iter().map(|(k, v)| format!("{}={}", k, v)).join(";"))
    }

    /// Maps a logical database name onto its physical name
    pub fn physical_database_name(&self, logical: &str) -> Option<&str> {
        self.logical_db_mapping.get(logical).map(|s| s.as_str())
    }

    /// Gets the physical database name for `logical`, failing if no
    /// decorator made the database available to this configuration
    pub fn vet_database(&self, logical: &str) -> Result<String> {
        let physical = self.physical_database_name(logical).unwrap_or(logical);

        if !self.used_db_names.iter().any(|n| n == physical) {
            bail!(
                "Database name \"{}\" is not in the list of used databases, it must be added by a database decorator first",
                logical
            );
        }

        Ok(physical.to_string())
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} db={} user={} connector={}",
            self.topology, self.default_db_name, self.user, self.connector
        )?;

        if let Some(ssl) = self.ssl {
            write!(f, " ssl={}", ssl.attribute())?;
        }

        Ok(())
    }
}
