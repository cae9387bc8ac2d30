use std::{env, sync::Mutex};

use once_cell::sync::Lazy;
use trestle_core::{
    config::DEFAULT_PORT,
    err::{anyhow, bail, ensure, Context, Result},
};

/// Overrides the base port of a run
pub const BASE_PORT_VAR: &str = "TRESTLE_BASE_PORT";

/// The most ports a run may use, including the base and bogus ports
pub const MAX_PORTS_USED: usize = 22;

static PORTS: Lazy<Mutex<Option<PortAllocator>>> = Lazy::new(|| Mutex::new(None));

/// Hands out distinct ports above a fixed base port.
///
/// The port directly above the base is reserved as a bogus port which
/// nothing listens on.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PortAllocator {
    base: u16,
    last_assigned: u16,
    assigned: usize,
}

impl PortAllocator {
    /// Fails unless every port the allocator may hand out fits above `base`
    pub fn new(base: u16) -> Result<Self> {
        ensure!(
            base as usize + MAX_PORTS_USED - 1 <= u16::MAX as usize,
            "Base port {} leaves no room for {} ports per run",
            base,
            MAX_PORTS_USED
        );

        Ok(Self {
            base,
            last_assigned: base + 1,
            assigned: 2,
        })
    }

    /// Reads the base port from the environment, falling back to the default
    pub fn from_env() -> Result<Self> {
        let base = match env::var(BASE_PORT_VAR) {
            Ok(port) => port
                .parse()
                .with_context(|| format!("Invalid {}: \"{}\"", BASE_PORT_VAR, port))?,
            Err(_) => DEFAULT_PORT,
        };

        Self::new(base)
    }

    pub fn base_port(&self) -> u16 {
        self.base
    }

    pub fn bogus_port(&self) -> u16 {
        self.base + 1
    }

    pub fn next_available_port(&mut self) -> Result<u16> {
        if self.assigned + 1 > MAX_PORTS_USED {
            bail!(
                "Port {} exceeds the expected maximum of {} ports per run",
                self.last_assigned as u32 + 1,
                MAX_PORTS_USED
            );
        }

        self.last_assigned = self
            .last_assigned
            .checked_add(1)
            .ok_or_else(|| anyhow!("Ran out of ports above {}", self.base))?;
        self.assigned += 1;
        Ok(self.last_assigned)
    }
}

fn with_ports<R>(cb: impl FnOnce(&mut PortAllocator) -> Result<R>) -> Result<R> {
    let mut ports = PORTS
        .lock()
        .map_err(|_| anyhow!("Port allocator lock poisoned"))?;

    if ports.is_none() {
        *ports = Some(PortAllocator::from_env()?);
    }

    match ports.as_mut() {
        Some(ports) => cb(ports),
        None => bail!("Port allocator not initialised"),
    }
}

/// The next unused port of the process-wide allocator
pub fn next_available_port() -> Result<u16> {
    with_ports(|p| p.next_available_port())
}

/// The base port of the process-wide allocator
pub fn base_port() -> Result<u16> {
    with_ports(|p| Ok(p.base_port()))
}

/// A port nothing listens on
pub fn bogus_port() -> Result<u16> {
    with_ports(|p| Ok(p.bogus_port()))
}
