use std::path::PathBuf;

use clap::Parser;

/// Runs suites of database driver tests
#[derive(Parser, Debug, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub enum Command {
    /// Runs the named suites, or every registered suite when none are named
    Run(Args),
    /// Prints the names of the registered suites
    List,
}

#[derive(Parser, Debug, PartialEq, Default)]
pub struct Args {
    /// The path of the harness configuration file
    #[clap(short, long, value_parser)]
    pub config: Option<PathBuf>,
    /// A suite to run, may be repeated
    #[clap(short, long = "suite", value_parser)]
    pub suites: Vec<String>,
    /// Print the report as json
    #[clap(long)]
    pub json: bool,
}
