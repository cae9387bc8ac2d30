use trestle_core::{config::Configuration, data::DataValue, err::Result};

use crate::common::SchemaObject;

/// Optional capabilities of a driver, checked when suites are composed
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Feature {
    DataSource,
    ConnectionPool,
    Xa,
    ClientServer,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::DataSource,
        Feature::ConnectionPool,
        Feature::Xa,
        Feature::ClientServer,
    ];
}

/// Obtains connections to the engine for a configuration
pub trait Driver {
    /// Gets the human readable name of the driver
    fn name(&self) -> &str;

    /// Whether the driver supports the supplied feature
    fn supports(&self, feature: Feature) -> bool;

    /// Opens a connection to the physical database as the supplied user.
    /// The database is created if it does not exist.
    fn connect(
        &self,
        conf: &Configuration,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>>;

    /// Shuts down the supplied database, if it is booted
    fn shutdown_database(&self, conf: &Configuration, database: &str) -> Result<()>;

    /// Removes the supplied database and all of its files
    fn drop_database(&self, conf: &Configuration, database: &str) -> Result<()>;

    /// Whether the physical database currently exists
    fn database_exists(&self, database: &str) -> bool;
}

/// An open connection to a database.
///
/// A connection is owned by the fixture or action which opened it and is
/// released when dropped.
pub trait Connection {
    /// The user the connection was authenticated as
    fn user(&self) -> &str;

    /// The physical database the connection is attached to
    fn database(&self) -> &str;

    /// Executes a statement, returning the number of affected rows
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Executes a query, returning all of its rows
    fn query(&mut self, sql: &str) -> Result<Vec<Vec<DataValue>>>;

    /// Sets (or clears when `None`) a database-wide property
    fn set_database_property(&mut self, key: &str, value: Option<&str>) -> Result<()>;

    /// Reads a database-wide property
    fn get_database_property(&mut self, key: &str) -> Result<Option<String>>;

    /// Lists the objects created by users in the database
    fn user_objects(&mut self) -> Result<Vec<SchemaObject>>;
}
