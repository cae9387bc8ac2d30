use std::{rc::Rc, time::Duration};

use trestle_connectors_memory::MemoryEngine;

use crate::context::Services;

/// Services backed by a fresh memory engine
pub(crate) fn mock_services() -> (MemoryEngine, Services) {
    let engine = MemoryEngine::new();
    let services = Services::new(
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
        Rc::new(engine.clone()),
    )
    .with_server_wait_time(Duration::from_millis(200));

    (engine, services)
}
