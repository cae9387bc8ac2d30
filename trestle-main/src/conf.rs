use std::path::Path;

use once_cell::sync::OnceCell;
use trestle_config::loader::ConfigLoader;
use trestle_core::{
    config::HarnessConfig,
    err::{Context, Result},
};

/// The configuration of this run, loaded once
static HARNESS_CONFIG: OnceCell<HarnessConfig> = OnceCell::new();

/// Loads the harness configuration, falling back to the defaults when no
/// file is supplied
pub fn init_conf(path: Option<&Path>) -> Result<&'static HarnessConfig> {
    HARNESS_CONFIG.get_or_try_init(|| match path {
        Some(path) => ConfigLoader::new()
            .load(path)
            .context("Failed to load configuration"),
        None => Ok(HarnessConfig::default()),
    })
}

/// Gets the harness configuration, the defaults if it was never loaded
pub fn conf() -> &'static HarnessConfig {
    HARNESS_CONFIG.get_or_init(HarnessConfig::default)
}
