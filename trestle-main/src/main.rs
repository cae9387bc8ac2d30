use std::process::ExitCode;

use clap::Parser;
use trestle_core::{config::HarnessConfig, err::Result};
use trestle_harness::process::SpawnRequest;
use trestle_logging::{error, info};
use trestle_main::{
    args::Command,
    conf::init_conf,
    run_suites,
    spawned::run_spawned,
    suites::SUITES,
};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{:?}", err);
            eprintln!("Error: {:?}", err);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    // launched by a spawned fixture of another trestle process
    if let Some(req) = SpawnRequest::from_env()? {
        trestle_logging::init_logging(&HarnessConfig::default())?;
        run_spawned(&req)?;
        return Ok(ExitCode::SUCCESS);
    }

    let args = match Command::parse() {
        Command::List => {
            for suite in SUITES {
                println!("{}", suite.name);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Run(args) => args,
    };

    let conf = init_conf(args.config.as_deref())?;
    trestle_logging::init_logging(conf)?;
    info!("Hi, thanks for using trestle!");

    let report = run_suites(conf, &args.suites)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
