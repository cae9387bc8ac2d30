use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::{Arc, Mutex},
};

use trestle_connectors_base::{
    common::{state, SqlError},
    interface::{Connection, Driver, Feature, NetworkServer, Policy, PolicyInstaller},
};
use trestle_core::{
    config::{Configuration, Topology},
    err::{anyhow, bail, Error, Result},
};
use trestle_logging::{debug, info};

mod connection;
pub use connection::*;
mod database;
pub use database::*;
mod executor;
mod parser;

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub databases: HashMap<String, MemoryDatabase>,
    pub servers: BTreeSet<(String, u16)>,
    /// Addresses bound by something other than a server
    pub occupied: BTreeSet<(String, u16)>,
    /// Started servers never answer pings
    pub unresponsive: bool,
    pub policy: Option<Policy>,
    pub open_connections: usize,
}

/// An in-process database engine, network server and policy installer.
/// Most useful for testing the harness without an external engine.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    state: Arc<Mutex<EngineState>>,
    features: Arc<HashSet<Feature>>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// An engine supporting every optional feature
    pub fn new() -> Self {
        Self::with_features(Feature::ALL)
    }

    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
            features: Arc::new(features.into_iter().collect()),
        }
    }

    pub(crate) fn with_state<R>(&self, cb: impl FnOnce(&mut EngineState) -> Result<R>) -> Result<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("Memory engine state lock poisoned"))?;

        cb(&mut state)
    }

    fn read_state<R: Default>(&self, cb: impl FnOnce(&EngineState) -> R) -> R {
        self.state.lock().map(|s| cb(&s)).unwrap_or_default()
    }

    pub(crate) fn release_connection(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.open_connections = state.open_connections.saturating_sub(1);
        }
    }

    /// A snapshot of the supplied database
    pub fn database(&self, name: &str) -> Option<MemoryDatabase> {
        self.read_state(|s| s.databases.get(name).cloned())
    }

    /// Names of all existing databases
    pub fn database_names(&self) -> Vec<String> {
        let mut names = self.read_state(|s| s.databases.keys().cloned().collect::<Vec<_>>());
        names.sort();
        names
    }

    /// The number of connections which have not been dropped
    pub fn open_connections(&self) -> usize {
        self.read_state(|s| s.open_connections)
    }

    /// Marks the address as bound by something other than a server
    pub fn occupy_port(&self, host: &str, port: u16) {
        if let Ok(mut state) = self.state.lock() {
            state.occupied.insert((host.to_string(), port));
        }
    }

    pub fn release_port(&self, host: &str, port: u16) {
        if let Ok(mut state) = self.state.lock() {
            state.occupied.remove(&(host.to_string(), port));
        }
    }

    /// When set, servers start but never answer pings
    pub fn set_unresponsive(&self, unresponsive: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unresponsive = unresponsive;
        }
    }
}

impl Driver for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    fn supports(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    fn connect(
        &self,
        conf: &Configuration,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        let generation = self.with_state(|inner| {
            if let Topology::Client { host, port } = conf.topology() {
                if !inner.servers.contains(&(host.clone(), *port)) {
                    return Err(Error::new(SqlError::new(
                        state::CONNECTION_REFUSED,
                        format!("Error connecting to server {} on port {}", host, port),
                    )));
                }
            }

            let db = inner.databases.entry(database.to_string()).or_insert_with(|| {
                info!("Creating database {}", database);
                MemoryDatabase::new(user)
            });
            db.boot();

            if !db.authenticate(user, password) {
                return Err(Error::new(SqlError::new(
                    state::INVALID_AUTHORIZATION,
                    "Connection authentication failure occurred. Reason: userid or password invalid",
                )));
            }

            let generation = db.generation;
            inner.open_connections += 1;
            Ok(generation)
        })?;

        debug!("Opened connection to {} as {} ({})", database, user, conf);
        Ok(Box::new(MemoryConnection::new(
            self.clone(),
            database,
            user,
            generation,
        )))
    }

    fn shutdown_database(&self, _conf: &Configuration, database: &str) -> Result<()> {
        self.with_state(|state| {
            if let Some(db) = state.databases.get_mut(database) {
                debug!("Shutting down database {}", database);
                db.shutdown();
            }
            Ok(())
        })
    }

    fn drop_database(&self, _conf: &Configuration, database: &str) -> Result<()> {
        self.with_state(|state| {
            if state.databases.remove(database).is_some() {
                info!("Removed database {}", database);
            }
            Ok(())
        })
    }

    fn database_exists(&self, database: &str) -> bool {
        self.read_state(|s| s.databases.contains_key(database))
    }
}

impl NetworkServer for MemoryEngine {
    fn start(&self, host: &str, port: u16) -> Result<()> {
        self.with_state(|state| {
            let addr = (host.to_string(), port);
            if state.occupied.contains(&addr) {
                bail!("Failed to start server on {}:{}, address already in use", host, port);
            }

            info!("Starting network server on {}:{}", host, port);
            state.servers.insert(addr);
            Ok(())
        })
    }

    fn stop(&self, host: &str, port: u16) -> Result<()> {
        self.with_state(|state| {
            if state.servers.remove(&(host.to_string(), port)) {
                info!("Stopped network server on {}:{}", host, port);
            }
            Ok(())
        })
    }

    fn ping(&self, host: &str, port: u16) -> bool {
        self.read_state(|s| !s.unresponsive && s.servers.contains(&(host.to_string(), port)))
    }

    fn is_port_free(&self, host: &str, port: u16) -> bool {
        let addr = (host.to_string(), port);
        self.read_state(|s| !s.servers.contains(&addr) && !s.occupied.contains(&addr))
    }
}

impl PolicyInstaller for MemoryEngine {
    fn install(&self, policy: &Policy) -> Result<()> {
        self.with_state(|state| {
            debug!("Installing security policy {}", policy.name);
            state.policy = Some(policy.clone());
            Ok(())
        })
    }

    fn uninstall(&self) -> Result<()> {
        self.with_state(|state| {
            if let Some(policy) = state.policy.take() {
                debug!("Uninstalled security policy {}", policy.name);
            }
            Ok(())
        })
    }

    fn installed(&self) -> Option<Policy> {
        self.read_state(|s| s.policy.clone())
    }
}
