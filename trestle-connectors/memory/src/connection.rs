use trestle_connectors_base::{
    common::{state, SchemaObject, SqlError},
    interface::Connection,
};
use trestle_core::{
    data::DataValue,
    err::{Error, Result},
};
use trestle_logging::debug;

use crate::{
    database::MemoryDatabase,
    executor::{MemoryQueryExecutor, Outcome},
    parser::parse,
    MemoryEngine,
};

/// A connection to a database held by a [`MemoryEngine`]
pub struct MemoryConnection {
    engine: MemoryEngine,
    database: String,
    user: String,
    generation: u64,
}

impl MemoryConnection {
    pub(crate) fn new(engine: MemoryEngine, database: &str, user: &str, generation: u64) -> Self {
        Self {
            engine,
            database: database.to_string(),
            user: user.to_string(),
            generation,
        }
    }

    /// Runs the callback against the database, failing if it was shut
    /// down or dropped since this connection was opened
    fn with_database<R>(&self, cb: impl FnOnce(&mut MemoryDatabase) -> Result<R>) -> Result<R> {
        self.engine.with_state(|inner| {
            let db = inner
                .databases
                .get_mut(&self.database)
                .filter(|db| db.booted && db.generation == self.generation)
                .ok_or_else(|| {
                    Error::new(SqlError::new(
                        state::DATABASE_SHUTDOWN,
                        format!("Database '{}' shutdown, no current connection", self.database),
                    ))
                })?;

            cb(db)
        })
    }

    fn run(&mut self, sql: &str) -> Result<Outcome> {
        debug!("[{}@{}] {}", self.user, self.database, sql);
        let stmt = parse(sql)?;
        let user = self.user.clone();

        self.with_database(|db| MemoryQueryExecutor::new(db, &user).run(stmt))
    }
}

impl Connection for MemoryConnection {
    fn user(&self) -> &str {
        &self.user
    }

    fn database(&self) -> &str {
        &self.database
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        Ok(match self.run(sql)? {
            Outcome::Count(c) => c,
            Outcome::Rows(rows) => rows.len() as u64,
        })
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Vec<DataValue>>> {
        match self.run(sql)? {
            Outcome::Rows(rows) => Ok(rows),
            Outcome::Count(_) => Err(Error::new(SqlError::new(
                "X0Y78",
                format!("Statement \"{}\" does not return a result set", sql),
            ))),
        }
    }

    fn set_database_property(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        debug!(
            "[{}@{}] Setting database property {} = {:?}",
            self.user, self.database, key, value
        );

        self.with_database(|db| {
            match value {
                Some(value) => db.properties.insert(key.to_string(), value.to_string()),
                None => db.properties.remove(key),
            };
            Ok(())
        })
    }

    fn get_database_property(&mut self, key: &str) -> Result<Option<String>> {
        self.with_database(|db| Ok(db.property(key).map(|s| s.to_string())))
    }

    fn user_objects(&mut self) -> Result<Vec<SchemaObject>> {
        self.with_database(|db| Ok(db.user_objects()))
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.engine.release_connection();
    }
}
