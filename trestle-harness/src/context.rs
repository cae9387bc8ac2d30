use std::{rc::Rc, time::Duration};

use trestle_connectors_base::interface::{Connection, Driver, NetworkServer, PolicyInstaller};
use trestle_core::{
    config::Configuration,
    err::{Context, Result},
};
use trestle_logging::trace;

use crate::ambient::Ambient;

/// How long to wait for a network server when nothing else is configured
pub const DEFAULT_SERVER_WAIT_TIME: Duration = Duration::from_secs(240);

/// The external collaborators driven by a run
#[derive(Clone)]
pub struct Services {
    pub driver: Rc<dyn Driver>,
    pub server: Rc<dyn NetworkServer>,
    pub policy: Rc<dyn PolicyInstaller>,
    /// Upper bound on waiting for a network server to start or its port to free up
    pub server_wait_time: Duration,
}

impl Services {
    pub fn new(
        driver: Rc<dyn Driver>,
        server: Rc<dyn NetworkServer>,
        policy: Rc<dyn PolicyInstaller>,
    ) -> Self {
        Self {
            driver,
            server,
            policy,
            server_wait_time: DEFAULT_SERVER_WAIT_TIME,
        }
    }

    pub fn with_server_wait_time(mut self, wait: Duration) -> Self {
        self.server_wait_time = wait;
        self
    }
}

/// Everything a fixture body or decorator action can see: the effective
/// configuration of the node being run and the collaborators to act on.
pub struct TestContext<'a> {
    services: &'a Services,
    configuration: &'a Configuration,
    ambient: &'a Ambient,
}

impl<'a> TestContext<'a> {
    pub fn new(services: &'a Services, configuration: &'a Configuration, ambient: &'a Ambient) -> Self {
        Self {
            services,
            configuration,
            ambient,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        self.configuration
    }

    pub fn services(&self) -> &Services {
        self.services
    }

    pub fn driver(&self) -> &dyn Driver {
        self.services.driver.as_ref()
    }

    pub fn server(&self) -> &dyn NetworkServer {
        self.services.server.as_ref()
    }

    pub fn policy_installer(&self) -> &dyn PolicyInstaller {
        self.services.policy.as_ref()
    }

    /// The configuration currently active in the runner
    pub fn ambient(&self) -> Option<Configuration> {
        self.ambient.current()
    }

    /// Opens a connection to the default database with the default credentials
    pub fn open_default_connection(&self) -> Result<Box<dyn Connection>> {
        let conf = self.configuration;
        self.connect(conf.default_db_name(), conf.user(), conf.password())
    }

    /// Opens a connection to the default database as another user
    pub fn open_connection_as(&self, user: &str, password: &str) -> Result<Box<dyn Connection>> {
        self.connect(self.configuration.default_db_name(), user, password)
    }

    /// Opens a connection to a database added under the supplied logical name
    pub fn open_connection(&self, logical: &str) -> Result<Box<dyn Connection>> {
        let physical = self.configuration.vet_database(logical)?;
        let conf = self.configuration;
        self.connect(&physical, conf.user(), conf.password())
    }

    /// Opens a connection to a logical database as another user
    pub fn open_connection_to(
        &self,
        logical: &str,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        let physical = self.configuration.vet_database(logical)?;
        self.connect(&physical, user, password)
    }

    /// Shuts down the default database
    pub fn shutdown_database(&self) -> Result<()> {
        let conf = self.configuration;
        self.driver()
            .shutdown_database(conf, conf.default_db_name())
            .with_context(|| format!("Failed to shut down database {}", conf.default_db_name()))
    }

    fn connect(&self, database: &str, user: &str, password: &str) -> Result<Box<dyn Connection>> {
        let conf = self.configuration;
        trace!("Connecting to {} as {}", conf.url_for(database), user);

        self.driver()
            .connect(conf, database, user, password)
            .with_context(|| {
                format!(
                    "Failed to connect to {} as {}",
                    conf.url_for(database),
                    user
                )
            })
    }
}
