use trestle_core::{config::HarnessConfig, err::Result};
pub use env_logger::{init, init_from_env};
pub use log::*;

mod limiting;
pub use limiting::*;

/// Configures the logger for a harness run
pub fn init_logging(conf: &HarnessConfig) -> Result<()> {
    let default = if conf.trace {
        "trace"
    } else if conf.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::try_init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, default),
    )?;
    Ok(())
}

/// Logging init function for tests
pub fn init_for_tests() {
    let res = env_logger::builder()
        .filter_module("trestle", LevelFilter::Trace)
        .is_test(true)
        .try_init();
    if let Err(err) = res {
        eprintln!("Failed to init logging: {}", err);
    }
}
